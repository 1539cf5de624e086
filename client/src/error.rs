//! Client-side auth error taxonomy.
//!
//! ERROR HANDLING
//! ==============
//! Session-store operations both record the message on the session (for UI
//! display) and return the error (for flow control). Refresh errors never
//! leave the scheduler; they are logged and retried on the next tick.

use access::GrantError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Bad credentials or a refused token.
    #[error("{0}")]
    Credentials(String),
    /// Network or server failure before a usable answer arrived.
    #[error("network error: {0}")]
    Transport(String),
    /// Proactive refresh failed; the session is kept until it actually lapses.
    #[error("token refresh failed: {0}")]
    Refresh(String),
    /// Detected locally: the access token's expiry has passed.
    #[error("session expired")]
    Expired,
    /// Federated login completion arrived without the fields a session needs.
    #[error("malformed login callback: {0}")]
    MalformedCallback(String),
    /// The API claimed success but omitted a required field.
    #[error("incomplete auth response: missing {0}")]
    Incomplete(&'static str),
}

impl From<GrantError> for AuthError {
    fn from(err: GrantError) -> Self {
        match err {
            GrantError::Rejected(message) => Self::Credentials(message),
            GrantError::Incomplete(field) => Self::Incomplete(field),
        }
    }
}
