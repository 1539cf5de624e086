//! Edge process configuration.
//!
//! All settings come from the environment (optionally seeded from `.env`).
//! Unparseable values fall back to the default rather than aborting startup.

use std::env;

const DEFAULT_PORT: u16 = 3000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeConfig {
    /// `PORT`.
    pub port: u16,
    /// `EDGE_GUARD`: when false every request passes through to the client
    /// guard. For local debugging only.
    pub guard_enabled: bool,
    /// `EDGE_BEARER_ROLES`: read roles from an unverified bearer token when
    /// no role cookie is present.
    pub bearer_roles: bool,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT, guard_enabled: true, bearer_roles: true }
    }
}

impl EdgeConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse("PORT", defaults.port),
            guard_enabled: env_bool("EDGE_GUARD").unwrap_or(defaults.guard_enabled),
            bearer_roles: env_bool("EDGE_BEARER_ROLES").unwrap_or(defaults.bearer_roles),
        }
    }
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
