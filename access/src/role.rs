//! Role vocabulary.
//!
//! Roles form a set, not a hierarchy. The only cross-role rule is that
//! `ADMIN` and `SUPER_ADMIN` both satisfy "admin-area" requirements, which
//! the route table expresses by listing both.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Elevated dashboard role. A user with none of these is a plain user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    SuperAdmin,
    Authority,
}

/// Ordered role set as carried on a [`crate::User`].
pub type RoleSet = BTreeSet<Role>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    /// Wire name, e.g. `"SUPER_ADMIN"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::Authority => "AUTHORITY",
        }
    }

    #[must_use]
    pub fn is_admin_like(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "SUPER_ADMIN" => Ok(Self::SuperAdmin),
            "AUTHORITY" => Ok(Self::Authority),
            _ => Err(UnknownRole(raw.to_owned())),
        }
    }
}

/// Collect the known roles out of arbitrary role names, dropping the rest
/// (`"USER"` and friends carry no elevated access).
pub fn roles_from_names<'a, I>(names: I) -> RoleSet
where
    I: IntoIterator<Item = &'a str>,
{
    names.into_iter().filter_map(|name| name.parse().ok()).collect()
}

/// Read a role claim that is either a single string or an array of strings.
///
/// Returns `None` for any other JSON shape. Non-string array entries are
/// skipped.
#[must_use]
pub fn roles_from_value(value: &Value) -> Option<RoleSet> {
    match value {
        Value::String(name) => Some(roles_from_names([name.as_str()])),
        Value::Array(items) => Some(roles_from_names(items.iter().filter_map(Value::as_str))),
        _ => None,
    }
}

/// Parse a JSON role list such as the `fda_user_roles` cookie value.
#[must_use]
pub fn parse_role_list(raw: &str) -> Option<RoleSet> {
    let value: Value = serde_json::from_str(raw.trim()).ok()?;
    roles_from_value(&value)
}

/// True when any of `allowed` is present in `held`.
#[must_use]
pub fn intersects(held: &RoleSet, allowed: &[Role]) -> bool {
    allowed.iter().any(|role| held.contains(role))
}

/// Comma-joined wire names, e.g. `"ADMIN,SUPER_ADMIN"`.
#[must_use]
pub fn join_roles<'a, I>(roles: I) -> String
where
    I: IntoIterator<Item = &'a Role>,
{
    roles
        .into_iter()
        .map(|role| role.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Serde helper for role lists coming from the identity API: unknown role
/// names are ignored instead of failing the whole payload.
///
/// # Errors
///
/// Fails only when the value is not a list of strings.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<RoleSet, D::Error>
where
    D: Deserializer<'de>,
{
    let names = Vec::<String>::deserialize(deserializer)?;
    Ok(roles_from_names(names.iter().map(String::as_str)))
}

#[cfg(test)]
#[path = "role_test.rs"]
mod tests;
