//! Edge route guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Runs ahead of page rendering on every navigable request. It cannot see
//! the browser's durable storage, so all it has is the `fda_session`
//! presence cookie plus whatever role hints it can recover: the
//! `fda_user_roles` cookie, or the `roles` claim of an unverified bearer
//! token.
//!
//! DESIGN
//! ======
//! - No presence cookie: redirect to login with the original path as `next`.
//! - Presence but no recoverable roles: defer. This is the common case, since
//!   the password login path never writes a role hint; the client role guard
//!   decides.
//! - Roles recovered: allow when they intersect the matching route rule,
//!   otherwise redirect to the forbidden page.
//!
//! TRADE-OFFS
//! ==========
//! Every input here is client-controlled. The guard only stops anonymous
//! traffic cheaply; it is never the sole authorization boundary.

use access::cookies::{PRESENCE_COOKIE, ROLES_COOKIE};
use access::role::{intersects, parse_role_list};
use access::routes::match_rule;
use access::token::{bearer_token, decode_claims};
use access::{AuthorizationCheck, Decision, RoleSet, Trust};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Uri};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::state::AppState;

/// Path prefixes the guard never intercepts.
const EXEMPT_PREFIXES: &[&str] = &["/auth/", "/api/", "/pkg/"];
const EXEMPT_PATHS: &[&str] = &["/", "/auth", "/api", "/pkg", "/healthz", "/favicon.ico"];

/// What the edge can see about a visitor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeSubject {
    pub has_presence: bool,
    /// `None` when no role hint could be read at all.
    pub roles: Option<RoleSet>,
}

/// Coarse check over cookies and unverified token claims.
#[derive(Clone, Copy, Debug)]
pub struct EdgeGuard {
    bearer_roles: bool,
}

impl EdgeGuard {
    #[must_use]
    pub fn new(bearer_roles: bool) -> Self {
        Self { bearer_roles }
    }

    /// Collect presence and role hints from request headers. Role cookie
    /// first, then the bearer token when enabled.
    #[must_use]
    pub fn subject_from_headers(&self, headers: &HeaderMap) -> EdgeSubject {
        let jar = CookieJar::from_headers(headers);
        let has_presence = jar.get(PRESENCE_COOKIE).is_some_and(|c| !c.value().is_empty());

        let cookie_roles = jar.get(ROLES_COOKIE).and_then(|c| parse_role_list(c.value()));
        let roles = cookie_roles.or_else(|| {
            if !self.bearer_roles {
                return None;
            }
            let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
            decode_claims(bearer_token(header)?)?.roles()
        });

        EdgeSubject { has_presence, roles }
    }
}

/// Auth pages, API routes, static assets and the root are never intercepted.
/// A file-like last segment only counts as an asset outside protected
/// prefixes.
#[must_use]
pub fn is_exempt(path: &str) -> bool {
    if EXEMPT_PATHS.contains(&path) || EXEMPT_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return true;
    }
    match_rule(path).is_none() && path.rsplit('/').next().is_some_and(|segment| segment.contains('.'))
}

impl AuthorizationCheck for EdgeGuard {
    type Subject = EdgeSubject;

    fn trust(&self) -> Trust {
        Trust::Coarse
    }

    fn check(&self, path: &str, subject: &EdgeSubject) -> Decision {
        if is_exempt(path) {
            return Decision::Allow;
        }
        if !subject.has_presence {
            return Decision::RedirectLogin { next: path.to_owned() };
        }
        let Some(roles) = &subject.roles else {
            return Decision::Defer;
        };
        match match_rule(path) {
            None => Decision::Allow,
            Some(rule) if intersects(roles, rule.allowed) => Decision::Allow,
            Some(rule) => Decision::Forbidden { required: rule.allowed.to_vec() },
        }
    }
}

// Login should bring the visitor back to the exact page, query included.
fn return_target(uri: &Uri) -> String {
    uri.path_and_query().map_or_else(|| uri.path().to_owned(), |pq| pq.as_str().to_owned())
}

/// Axum middleware applying [`EdgeGuard`] to every request.
pub async fn edge_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if !state.config.guard_enabled {
        return next.run(req).await;
    }

    let path = req.uri().path().to_owned();
    let subject = state.guard.subject_from_headers(req.headers());
    let decision = match state.guard.check(&path, &subject) {
        Decision::RedirectLogin { .. } => Decision::RedirectLogin { next: return_target(req.uri()) },
        other => other,
    };

    match decision.redirect_target() {
        Some(target) => {
            tracing::info!(%path, decision = decision.label(), %target, "edge redirect");
            Redirect::temporary(&target).into_response()
        }
        None => {
            tracing::debug!(%path, decision = decision.label(), "edge pass");
            next.run(req).await
        }
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
