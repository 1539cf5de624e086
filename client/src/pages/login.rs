//! Password login page.

use access::RoleSet;
use access::redirect::safe_return_url;
use access::routes::landing_path;
use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_navigate, use_query_map};

use crate::state::session::{Session, SessionStore};

const MISSING_FIELDS: &str = "Enter both your identifier and password.";
const CALLBACK_FAILED: &str = "Sign-in could not be completed. Please try again.";

/// Trim the identifier and require both fields.
pub(crate) fn validate_login_input(identifier: &str, secret: &str) -> Result<(String, String), &'static str> {
    let identifier = identifier.trim();
    if identifier.is_empty() || secret.is_empty() {
        return Err(MISSING_FIELDS);
    }
    Ok((identifier.to_owned(), secret.to_owned()))
}

/// Where to go after a successful login.
pub(crate) fn post_login_path(next: Option<&str>, roles: &RoleSet) -> String {
    safe_return_url(next.unwrap_or_default(), landing_path(roles)).to_owned()
}

/// Message shown when arriving at the page, e.g. after a failed callback
/// or a forced sign-out.
pub(crate) fn arrival_notice(error_param: Option<&str>, session_error: Option<&str>) -> Option<String> {
    match error_param {
        Some("callback") => Some(CALLBACK_FAILED.to_owned()),
        _ => session_error.map(str::to_owned),
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let store = expect_context::<SessionStore>();
    let session = expect_context::<RwSignal<Session>>();
    let query = use_query_map();

    let identifier = RwSignal::new(String::new());
    let secret = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    let info = RwSignal::new(session.with_untracked(|s| {
        arrival_notice(query.with_untracked(|q| q.get("error")).as_deref(), s.error.as_deref())
    }));
    let destination = RwSignal::new(None::<String>);

    let navigate = use_navigate();
    Effect::new(move || {
        if let Some(target) = destination.get() {
            navigate(&target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (identifier_value, secret_value) = match validate_login_input(&identifier.get(), &secret.get()) {
            Ok(values) => values,
            Err(message) => {
                info.set(Some(message.to_owned()));
                return;
            }
        };
        busy.set(true);
        info.set(None);

        #[cfg(feature = "hydrate")]
        {
            let store = store.clone();
            let next = query.with_untracked(|q| q.get("next"));
            leptos::task::spawn_local(async move {
                match store.login_with_credentials(&identifier_value, &secret_value).await {
                    Ok(()) => {
                        let roles = store.state().user.map(|u| u.roles).unwrap_or_default();
                        destination.set(Some(post_login_path(next.as_deref(), &roles)));
                    }
                    Err(err) => {
                        info.set(Some(err.to_string()));
                        secret.set(String::new());
                        busy.set(false);
                    }
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (&store, identifier_value, secret_value);
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Flood Dashboard"</h1>
                <p class="login-card__subtitle">"Sign in to continue"</p>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="text"
                        autocomplete="username"
                        placeholder="Email or username"
                        prop:value=move || identifier.get()
                        on:input=move |ev| identifier.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        autocomplete="current-password"
                        placeholder="Password"
                        prop:value=move || secret.get()
                        on:input=move |ev| secret.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Signing in..." } else { "Sign in" }}
                    </button>
                </form>
                <Show when=move || info.with(Option::is_some)>
                    <p class="login-message login-message--error">{move || info.get().unwrap_or_default()}</p>
                </Show>
            </div>
        </div>
    }
}

#[cfg(test)]
#[path = "login_test.rs"]
mod tests;
