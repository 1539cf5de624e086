//! Best-effort compact token decoding.
//!
//! SECURITY
//! ========
//! Nothing here verifies a signature. The decoded [`Claims`] are untrusted
//! hints and may only feed UX decisions such as the edge layer's coarse role
//! check. Callers get an `Option` so the "could not read" case stays
//! explicit; a decode failure means "no information", never an error.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Map, Value};

use crate::role::{self, RoleSet};

/// Unverified payload claims of a compact token.
#[derive(Clone, Debug, PartialEq)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Raw claim by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// `roles` claim, accepting a single string or an array of strings.
    #[must_use]
    pub fn roles(&self) -> Option<RoleSet> {
        self.get("roles").and_then(role::roles_from_value)
    }
}

/// Decode the payload segment of a three-segment token.
///
/// Accepts the url-safe and the standard base64 alphabet, padded or not.
#[must_use]
pub fn decode_claims(token: &str) -> Option<Claims> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (segments.next(), segments.next(), segments.next(), segments.next())
    else {
        return None;
    };

    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD.decode(normalized).ok()?;
    match serde_json::from_slice::<Value>(&bytes).ok()? {
        Value::Object(map) => Some(Claims(map)),
        _ => None,
    }
}

/// Strip a case-insensitive `Bearer ` scheme from an `Authorization` value.
#[must_use]
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let value = header_value.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
