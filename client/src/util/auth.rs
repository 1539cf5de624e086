//! Authoritative route authorization and session validation.
//!
//! SYSTEM CONTEXT
//! ==============
//! The edge guard only sees cookies and unverified token claims, so it lets
//! most signed-in traffic through. [`ClientRoleGuard`] is the check that
//! actually decides: it reads the user object returned by the identity API
//! at login. Every protected layout runs it, together with the
//! [`validate_session`] backstop for sessions idle past their expiry.

use access::role::intersects;
use access::routes::{login_target, match_rule};
use access::{AuthorizationCheck, Decision, Role, Trust};
use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::state::session::{AuthStatus, Session, SessionStore};

/// Role check over the client session for one protected area.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientRoleGuard {
    required: Vec<Role>,
}

impl ClientRoleGuard {
    #[must_use]
    pub fn new(required: &[Role]) -> Self {
        Self { required: required.to_vec() }
    }

    /// Guard using the route table entry for `path`; `None` when unprotected.
    #[must_use]
    pub fn for_path(path: &str) -> Option<Self> {
        match_rule(path).map(|rule| Self::new(rule.allowed))
    }

    #[must_use]
    pub fn required(&self) -> &[Role] {
        &self.required
    }
}

impl AuthorizationCheck for ClientRoleGuard {
    type Subject = Session;

    fn trust(&self) -> Trust {
        Trust::Authoritative
    }

    fn check(&self, path: &str, session: &Session) -> Decision {
        match session.status {
            AuthStatus::Idle | AuthStatus::Loading => Decision::Pending,
            AuthStatus::Unauthenticated => Decision::RedirectLogin { next: path.to_owned() },
            AuthStatus::Authenticated => match &session.user {
                None => Decision::RedirectLogin { next: path.to_owned() },
                Some(user) if intersects(&user.roles, &self.required) => Decision::Allow,
                Some(_) => Decision::Forbidden { required: self.required.clone() },
            },
        }
    }
}

/// Result of the on-mount session validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Validation {
    /// Session still being established; nothing checked.
    Pending,
    SignedOut,
    Valid,
    /// The token had lapsed; the store has already been signed out.
    Expired,
}

/// Sign out a session whose access token has lapsed.
pub fn validate_session(store: &SessionStore) -> Validation {
    match store.status() {
        AuthStatus::Idle | AuthStatus::Loading => Validation::Pending,
        AuthStatus::Unauthenticated => Validation::SignedOut,
        AuthStatus::Authenticated if store.is_token_expired() => {
            log::info!("access token expired; signing out");
            store.expire();
            Validation::Expired
        }
        AuthStatus::Authenticated => Validation::Valid,
    }
}

/// Validate once the session is authenticated and send an expired visitor
/// back to login with `path` as the return target.
pub fn install_session_validator<F>(session: RwSignal<Session>, store: SessionStore, path: String, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        if session.with(|s| s.status) != AuthStatus::Authenticated {
            return;
        }
        if validate_session(&store) == Validation::Expired {
            navigate(&login_target(&path), NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
