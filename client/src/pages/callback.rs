//! Federated login completion page (`/auth/callback`).
//!
//! The fragment is removed from the visible URL before it is parsed, so the
//! tokens do not linger in history or get copied along with the address.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::state::session::SessionStore;
use crate::util::callback::{CALLBACK_ERROR_TARGET, parse_callback_fragment};

/// Apply a callback fragment to the store and return where to go next.
///
/// A malformed fragment leaves the store untouched.
pub fn complete_callback(store: &SessionStore, fragment: &str) -> String {
    match parse_callback_fragment(fragment) {
        Ok(payload) => {
            let target = payload.return_path().to_owned();
            store.set_session(payload.grant);
            log::info!("federated sign-in completed");
            target
        }
        Err(err) => {
            log::warn!("{err}");
            CALLBACK_ERROR_TARGET.to_owned()
        }
    }
}

/// Read the fragment and replace the current history entry with the same
/// URL minus the fragment.
#[cfg(feature = "hydrate")]
fn take_fragment() -> String {
    let Some(window) = web_sys::window() else {
        return String::new();
    };
    let location = window.location();
    let fragment = location.hash().unwrap_or_default();
    if let (Ok(history), Ok(search)) = (window.history(), location.search()) {
        let clean = format!("{}{search}", access::routes::CALLBACK_PATH);
        let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&clean));
    }
    fragment
}

#[component]
pub fn CallbackPage() -> impl IntoView {
    let store = expect_context::<SessionStore>();
    let navigate = use_navigate();

    Effect::new(move || {
        #[cfg(feature = "hydrate")]
        {
            let target = complete_callback(&store, &take_fragment());
            navigate(&target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (&store, &navigate);
        }
    });

    view! {
        <div class="login-page">
            <p class="login-message">"Completing sign-in..."</p>
        </div>
    }
}
