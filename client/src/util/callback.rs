//! Federated login completion.
//!
//! The identity provider redirects to `/auth/callback` with the token triple
//! and user JSON in the URL fragment, which never reaches server logs. The
//! fragment is parsed into a complete [`SessionGrant`] or rejected whole; a
//! partial session is never created.

use access::redirect::safe_return_url;
use access::routes::landing_path;
use access::{SessionGrant, User};
use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::AuthError;

/// Where a failed completion sends the visitor.
pub const CALLBACK_ERROR_TARGET: &str = "/auth/login?error=callback";

#[derive(Debug, Default, Deserialize)]
struct RawFragment {
    #[serde(alias = "accessToken")]
    access_token: Option<String>,
    #[serde(alias = "refreshToken")]
    refresh_token: Option<String>,
    #[serde(alias = "expiresAt")]
    expires_at: Option<String>,
    user: Option<String>,
    next: Option<String>,
}

/// A successfully parsed callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackPayload {
    pub grant: SessionGrant,
    /// Requested post-login destination, unvalidated.
    pub next: Option<String>,
}

impl CallbackPayload {
    /// Destination after completion: `next` when it is a safe relative
    /// path, otherwise the landing page for the user's roles.
    #[must_use]
    pub fn return_path(&self) -> &str {
        let fallback = landing_path(&self.grant.user.roles);
        safe_return_url(self.next.as_deref().unwrap_or_default(), fallback)
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AuthError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AuthError::MalformedCallback(format!("missing {field}")))
}

/// Accepts RFC 3339 or unix seconds.
fn parse_expiry(raw: &str) -> Result<OffsetDateTime, AuthError> {
    let raw = raw.trim();
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        let secs: i64 = raw
            .parse()
            .map_err(|_| AuthError::MalformedCallback("expires_at out of range".to_owned()))?;
        return OffsetDateTime::from_unix_timestamp(secs)
            .map_err(|_| AuthError::MalformedCallback("expires_at out of range".to_owned()));
    }
    OffsetDateTime::parse(raw, &Rfc3339).map_err(|e| AuthError::MalformedCallback(format!("expires_at: {e}")))
}

/// Parse the fragment (with or without the leading `#`).
///
/// # Errors
///
/// [`AuthError::MalformedCallback`] when the fragment is not form-encoded or
/// any of `access_token`, `refresh_token`, `expires_at`, `user` is missing
/// or unreadable.
pub fn parse_callback_fragment(fragment: &str) -> Result<CallbackPayload, AuthError> {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let raw: RawFragment =
        serde_urlencoded::from_str(fragment).map_err(|e| AuthError::MalformedCallback(e.to_string()))?;

    let access_token = required(raw.access_token, "access_token")?;
    let refresh_token = required(raw.refresh_token, "refresh_token")?;
    let expires_at = parse_expiry(&required(raw.expires_at, "expires_at")?)?;
    let user: User = serde_json::from_str(&required(raw.user, "user")?)
        .map_err(|e| AuthError::MalformedCallback(format!("user: {e}")))?;

    Ok(CallbackPayload {
        grant: SessionGrant { user, access_token, refresh_token, expires_at },
        next: raw.next.filter(|n| !n.is_empty()),
    })
}

#[cfg(test)]
#[path = "callback_test.rs"]
mod tests;
