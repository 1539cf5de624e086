//! Route protection table and well-known navigation targets.

use crate::role::{Role, RoleSet, join_roles};

pub const LOGIN_PATH: &str = "/auth/login";
pub const CALLBACK_PATH: &str = "/auth/callback";
pub const FORBIDDEN_PATH: &str = "/forbidden";

/// A protected path prefix and the roles that may enter it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteRule {
    pub prefix: &'static str,
    pub allowed: &'static [Role],
}

/// Ordered protection table. First literal prefix match wins.
pub const ROUTE_RULES: &[RouteRule] = &[
    RouteRule { prefix: "/admin", allowed: &[Role::Admin, Role::SuperAdmin] },
    RouteRule { prefix: "/authority", allowed: &[Role::Authority] },
    RouteRule { prefix: "/superadmin", allowed: &[Role::SuperAdmin] },
];

/// Find the rule protecting `path`, if any. Unmatched paths are unprotected.
#[must_use]
pub fn match_rule(path: &str) -> Option<&'static RouteRule> {
    ROUTE_RULES.iter().find(|rule| path.starts_with(rule.prefix))
}

/// Login route carrying the original path and query as a form-encoded
/// `next` value.
#[must_use]
pub fn login_target(next: &str) -> String {
    match serde_urlencoded::to_string([("next", next)]) {
        Ok(query) => format!("{LOGIN_PATH}?{query}"),
        Err(_) => LOGIN_PATH.to_owned(),
    }
}

/// Forbidden route listing the roles the denied area needed.
#[must_use]
pub fn forbidden_target(required: &[Role]) -> String {
    if required.is_empty() {
        return FORBIDDEN_PATH.to_owned();
    }
    format!("{FORBIDDEN_PATH}?required={}", join_roles(required))
}

/// Default destination after authentication when no `next` was requested.
#[must_use]
pub fn landing_path(roles: &RoleSet) -> &'static str {
    if roles.iter().any(|role| role.is_admin_like()) {
        "/admin"
    } else if roles.contains(&Role::Authority) {
        "/authority"
    } else {
        "/"
    }
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
