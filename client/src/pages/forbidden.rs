//! Authorization failure page: names the roles the area needed and offers logout.

use access::Role;
use access::routes::LOGIN_PATH;
use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_navigate, use_query_map};

use crate::state::session::{AuthStatus, Session, SessionStore};

/// Parse the `required` query value (`ADMIN,SUPER_ADMIN`); unknown names are skipped.
pub(crate) fn required_roles(raw: Option<&str>) -> Vec<Role> {
    raw.unwrap_or_default()
        .split(',')
        .filter_map(|name| name.parse().ok())
        .collect()
}

pub(crate) fn describe_required(roles: &[Role]) -> String {
    if roles.is_empty() {
        return "You do not have access to this area.".to_owned();
    }
    let names: Vec<&str> = roles.iter().map(|role| role.as_str()).collect();
    format!("This area requires one of: {}.", names.join(", "))
}

#[component]
pub fn ForbiddenPage() -> impl IntoView {
    let store = expect_context::<SessionStore>();
    let session = expect_context::<RwSignal<Session>>();
    let query = use_query_map();

    let message = Memo::new(move |_| describe_required(&required_roles(query.with(|q| q.get("required")).as_deref())));
    let who = move || session.with(|s| s.user.as_ref().map(|u| u.label().to_owned()).unwrap_or_default());

    let navigate = use_navigate();
    Effect::new(move || {
        if session.with(|s| s.status) == AuthStatus::Unauthenticated {
            navigate(LOGIN_PATH, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });

    view! {
        <div class="forbidden-page">
            <h1>"Access denied"</h1>
            <p class="forbidden-page__reason">{move || message.get()}</p>
            <p class="forbidden-page__who">"Signed in as " {who}</p>
            <button class="login-button" on:click=move |_| store.logout()>
                "Sign out"
            </button>
        </div>
    }
}
