//! Identity API client.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`.
//! Server-side (SSR) and tests: the HTTP implementation reports the call as
//! unavailable; the session store only ever talks to the [`AuthApi`] trait
//! so tests substitute their own implementation.
//!
//! ERROR HANDLING
//! ==============
//! A non-2xx answer that still carries a JSON body is handed back as-is so
//! the server's `message` reaches the user; bodiless failures map to
//! [`AuthError::Credentials`] for 401/403 and [`AuthError::Transport`]
//! otherwise.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use access::{LoginRequest, TokenResponse};
use async_trait::async_trait;

use crate::error::AuthError;

/// Base path of the identity API, overridable at build time.
pub const API_BASE: &str = match option_env!("FDA_API_BASE") {
    Some(base) => base,
    None => "/api",
};

/// Login and refresh endpoints of the identity backend.
///
/// Futures are `?Send`: in the browser everything runs on the UI thread.
#[async_trait(?Send)]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`.
    async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, AuthError>;

    /// `POST /auth/refresh` with the current refresh token.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError>;
}

/// [`AuthApi`] over HTTP + JSON.
#[derive(Clone, Debug)]
pub struct HttpAuthApi {
    base: String,
}

impl Default for HttpAuthApi {
    fn default() -> Self {
        Self::new(API_BASE)
    }
}

impl HttpAuthApi {
    #[must_use]
    pub fn new(base: &str) -> Self {
        Self { base: base.trim_end_matches('/').to_owned() }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

#[cfg(any(test, feature = "hydrate"))]
fn status_error(status: u16) -> AuthError {
    match status {
        401 | 403 => AuthError::Credentials(format!("request rejected: {status}")),
        _ => AuthError::Transport(format!("request failed: {status}")),
    }
}

#[cfg(any(test, feature = "hydrate"))]
fn classify_response(ok: bool, status: u16, body: Option<TokenResponse>) -> Result<TokenResponse, AuthError> {
    match body {
        Some(body) if ok || !body.success => Ok(body),
        _ => Err(status_error(status)),
    }
}

#[cfg(feature = "hydrate")]
async fn post_json<B: serde::Serialize>(url: &str, body: &B) -> Result<TokenResponse, AuthError> {
    let resp = gloo_net::http::Request::post(url)
        .json(body)
        .map_err(|e| AuthError::Transport(e.to_string()))?
        .send()
        .await
        .map_err(|e| AuthError::Transport(e.to_string()))?;
    let body = resp.json::<TokenResponse>().await.ok();
    classify_response(resp.ok(), resp.status(), body)
}

#[async_trait(?Send)]
impl AuthApi for HttpAuthApi {
    async fn login(&self, request: &LoginRequest) -> Result<TokenResponse, AuthError> {
        let url = self.endpoint("/auth/login");
        #[cfg(feature = "hydrate")]
        {
            post_json(&url, request).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (url, request);
            Err(AuthError::Transport("not available on server".to_owned()))
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        let url = self.endpoint("/auth/refresh");
        #[cfg(feature = "hydrate")]
        {
            let body = access::RefreshRequest { refresh_token: refresh_token.to_owned() };
            post_json(&url, &body).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (url, refresh_token);
            Err(AuthError::Transport("not available on server".to_owned()))
        }
    }
}
