//! Reactive wrapper around [`ClientRoleGuard`].
//!
//! Re-evaluates whenever the session or the current path changes, so moving
//! between protected areas while signed in is checked against each area's
//! own requirement. Navigation happens in an effect, never during render.

use access::{AuthorizationCheck, Decision};
use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::state::session::Session;
use crate::util::auth::ClientRoleGuard;

#[component]
pub fn RoleGuard(guard: ClientRoleGuard, children: ChildrenFn) -> impl IntoView {
    let session = expect_context::<RwSignal<Session>>();
    let location = use_location();
    let guard = StoredValue::new(guard);

    let decision = Memo::new(move |_| {
        let path = location.pathname.get();
        session.with(|s| guard.with_value(|g| g.check(&path, s)))
    });

    let navigate = use_navigate();
    Effect::new(move || {
        if let Some(target) = decision.get().redirect_target() {
            navigate(&target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });

    move || match decision.get() {
        Decision::Allow | Decision::Defer => children().into_any(),
        Decision::Pending => view! { <p class="guard-status">"Checking your session..."</p> }.into_any(),
        Decision::RedirectLogin { .. } | Decision::Forbidden { .. } => {
            view! { <p class="guard-status">"Redirecting..."</p> }.into_any()
        }
    }
}
