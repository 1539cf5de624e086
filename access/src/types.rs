//! Identity API wire types.
//!
//! The login and refresh endpoints share one response shape. Fields are
//! optional on the wire so a failed login (`success: false`) still decodes;
//! [`TokenResponse::into_grant`] is the single place that decides whether a
//! response is complete enough to become a session.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::role::{self, Role, RoleSet};

/// Verified user profile as returned by the identity API at login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, alias = "name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "role::deserialize_lenient")]
    pub roles: RoleSet,
}

impl User {
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    #[must_use]
    pub fn is_admin_like(&self) -> bool {
        self.roles.iter().any(|role| role.is_admin_like())
    }

    /// Name to show in the UI, falling back to the email address.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

/// `POST /auth/login` body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub secret: String,
}

/// `POST /auth/refresh` body.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response of both the login and the refresh endpoint.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Everything needed to enter the authenticated state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionGrant {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: OffsetDateTime,
}

/// A refreshed token triple. The refresh endpoint may omit the user, in
/// which case the profile from login stays in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRenewal {
    pub user: Option<User>,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrantError {
    /// The API answered but refused the credentials or token.
    #[error("{0}")]
    Rejected(String),
    /// The API claimed success but left out a required field.
    #[error("response missing {0}")]
    Incomplete(&'static str),
}

const DEFAULT_REJECTION: &str = "authentication failed";

impl TokenResponse {
    /// Convert a response into a grant.
    ///
    /// # Errors
    ///
    /// [`GrantError::Rejected`] when `success` is false, or
    /// [`GrantError::Incomplete`] naming the first missing field.
    pub fn into_grant(self) -> Result<SessionGrant, GrantError> {
        let renewal = self.into_renewal()?;
        let user = renewal.user.ok_or(GrantError::Incomplete("user"))?;
        Ok(SessionGrant {
            user,
            access_token: renewal.access_token,
            refresh_token: renewal.refresh_token,
            expires_at: renewal.expires_at,
        })
    }

    /// Convert a refresh response, where only the token triple is required.
    ///
    /// # Errors
    ///
    /// Same as [`TokenResponse::into_grant`], except a missing user is fine.
    pub fn into_renewal(self) -> Result<TokenRenewal, GrantError> {
        if !self.success {
            let message = self
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REJECTION.to_owned());
            return Err(GrantError::Rejected(message));
        }
        let access_token = non_empty(self.access_token).ok_or(GrantError::Incomplete("accessToken"))?;
        let refresh_token = non_empty(self.refresh_token).ok_or(GrantError::Incomplete("refreshToken"))?;
        let expires_at = self.expires_at.ok_or(GrantError::Incomplete("expiresAt"))?;
        Ok(TokenRenewal { user: self.user, access_token, refresh_token, expires_at })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
