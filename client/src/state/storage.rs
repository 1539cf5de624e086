//! Durable session record.
//!
//! SYSTEM CONTEXT
//! ==============
//! Secrets (access and refresh token) live only here, in one namespaced
//! `localStorage` record. The edge server never sees this storage; it only
//! sees the presence cookie written by [`super::bridge`].

use std::sync::{Mutex, PoisonError};

use access::User;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::session::{AuthStatus, Session};

pub const STORAGE_KEY: &str = "fda-auth";

/// The persisted subset of a [`Session`]. `error` is never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub status: AuthStatus,
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
}

impl From<&Session> for PersistedSession {
    fn from(session: &Session) -> Self {
        Self {
            status: session.status,
            user: session.user.clone(),
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_at: session.expires_at,
        }
    }
}

impl PersistedSession {
    /// Rebuild an authenticated session, or `None` when the record does not
    /// satisfy the authenticated invariant (including records saved mid-login).
    #[must_use]
    pub fn restore(self) -> Option<Session> {
        if self.status != AuthStatus::Authenticated {
            return None;
        }
        let session = Session {
            status: AuthStatus::Authenticated,
            user: Some(self.user?),
            access_token: Some(self.access_token?),
            refresh_token: self.refresh_token,
            expires_at: self.expires_at,
            error: None,
        };
        Some(session)
    }
}

/// Durable client storage for the session record.
pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Option<PersistedSession>;
    fn save(&self, record: &PersistedSession);
    fn clear(&self);
}

/// `localStorage`-backed storage. No-ops outside the browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

#[cfg(feature = "hydrate")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

impl SessionStorage for BrowserStorage {
    fn load(&self) -> Option<PersistedSession> {
        #[cfg(feature = "hydrate")]
        {
            let raw = local_storage()?.get_item(STORAGE_KEY).ok().flatten()?;
            serde_json::from_str(&raw).ok()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            None
        }
    }

    fn save(&self, record: &PersistedSession) {
        #[cfg(feature = "hydrate")]
        {
            let Some(storage) = local_storage() else {
                return;
            };
            let Ok(raw) = serde_json::to_string(record) else {
                return;
            };
            let _ = storage.set_item(STORAGE_KEY, &raw);
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = record;
        }
    }

    fn clear(&self) {
        #[cfg(feature = "hydrate")]
        {
            if let Some(storage) = local_storage() {
                let _ = storage.remove_item(STORAGE_KEY);
            }
        }
    }
}

/// In-memory storage holding the serialized record, for SSR and tests.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    raw: Mutex<Option<String>>,
}

impl MemoryStorage {
    /// Seed with an already-serialized record, as a previous page load would leave it.
    #[must_use]
    pub fn with_raw(raw: &str) -> Self {
        Self { raw: Mutex::new(Some(raw.to_owned())) }
    }

    #[must_use]
    pub fn raw(&self) -> Option<String> {
        self.raw.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Option<PersistedSession> {
        let raw = self.raw()?;
        serde_json::from_str(&raw).ok()
    }

    fn save(&self, record: &PersistedSession) {
        if let Ok(raw) = serde_json::to_string(record) {
            *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = Some(raw);
        }
    }

    fn clear(&self) {
        *self.raw.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
