//! Session store: the single authoritative authentication record.
//!
//! ARCHITECTURE
//! ============
//! One [`SessionStore`] exists per client process (provided through Leptos
//! context). Readers take snapshots with [`SessionStore::state`] or
//! [`SessionStore::subscribe`]; all writes go through the named transitions
//! below, each of which replaces the whole record at once so no reader sees
//! an old token paired with a new expiry.
//!
//! ```text
//!   idle ──login──▶ loading ──ok──▶ authenticated ──logout/expire──▶ unauthenticated
//!     │                └──err──▶ unauthenticated ──login──▶ loading
//!     └──hydrate──▶ authenticated | unauthenticated
//! ```
//!
//! Every transition that announces `authenticated` writes the presence
//! cookie first; every transition that announces `unauthenticated` removes
//! it first. Durable storage is written in the same step.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use access::cookies::PRESENCE_TTL_DAYS;
use access::{LoginRequest, Role, SessionGrant, TokenRenewal, User};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use super::bridge::SessionBridge;
use super::storage::{PersistedSession, SessionStorage};
use crate::error::AuthError;
use crate::net::api::AuthApi;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    #[default]
    Idle,
    Loading,
    Authenticated,
    Unauthenticated,
}

/// Snapshot of the authentication record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub status: AuthStatus,
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<OffsetDateTime>,
    /// Last failure message, for display.
    pub error: Option<String>,
}

impl Session {
    fn loading() -> Self {
        Self { status: AuthStatus::Loading, ..Self::default() }
    }

    fn signed_out(error: Option<String>) -> Self {
        Self { status: AuthStatus::Unauthenticated, error, ..Self::default() }
    }

    fn from_grant(grant: SessionGrant) -> Self {
        Self {
            status: AuthStatus::Authenticated,
            user: Some(grant.user),
            access_token: Some(grant.access_token),
            refresh_token: Some(grant.refresh_token),
            expires_at: Some(grant.expires_at),
            error: None,
        }
    }

    /// Status is authenticated and both user and access token are present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated && self.user.is_some() && self.access_token.is_some()
    }

    /// True when there is no expiry or `now` has reached it.
    #[must_use]
    pub fn is_token_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_none_or(|expires_at| now >= expires_at)
    }

    /// True when an expiry exists and `now` is within `within` of it (or past it).
    #[must_use]
    pub fn is_token_expiring_soon_at(&self, now: OffsetDateTime, within: Duration) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at - within)
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.user.as_ref().is_some_and(|user| user.has_role(role))
    }

    #[must_use]
    pub fn is_admin_like(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin_like)
    }
}

/// Source of "now"; injectable so expiry logic can be tested.
pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

type Listener = Arc<dyn Fn(&Session) + Send + Sync>;

/// Handle returned by [`SessionStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Shared handle to the process-wide session. Cloning shares the same record.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: Mutex<Session>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_listener: AtomicU64,
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn SessionStorage>,
    bridge: SessionBridge,
    clock: Clock,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionStore {
    #[must_use]
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn SessionStorage>, bridge: SessionBridge) -> Self {
        Self::with_clock(api, storage, bridge, Arc::new(OffsetDateTime::now_utc))
    }

    #[must_use]
    pub fn with_clock(
        api: Arc<dyn AuthApi>,
        storage: Arc<dyn SessionStorage>,
        bridge: SessionBridge,
        clock: Clock,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(Session::default()),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(1),
                api,
                storage,
                bridge,
                clock,
            }),
        }
    }

    // =========================================================================
    // READ SIDE
    // =========================================================================

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> Session {
        lock(&self.inner.state).clone()
    }

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        lock(&self.inner.state).status
    }

    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        (self.inner.clock)()
    }

    /// Run `listener` after every committed transition, with the store unlocked.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_listener.fetch_add(1, Ordering::Relaxed));
        lock(&self.inner.listeners).push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        lock(&self.inner.listeners).retain(|(existing, _)| *existing != id);
    }

    #[must_use]
    pub fn is_token_expired(&self) -> bool {
        let now = self.now();
        lock(&self.inner.state).is_token_expired_at(now)
    }

    #[must_use]
    pub fn is_token_expiring_soon(&self, within: Duration) -> bool {
        let now = self.now();
        lock(&self.inner.state).is_token_expiring_soon_at(now, within)
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        lock(&self.inner.state).has_role(role)
    }

    #[must_use]
    pub fn is_admin_like(&self) -> bool {
        lock(&self.inner.state).is_admin_like()
    }

    pub(crate) fn api(&self) -> Arc<dyn AuthApi> {
        Arc::clone(&self.inner.api)
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Restore the persisted record at startup. Only acts from `idle`.
    pub fn hydrate(&self) {
        if self.status() != AuthStatus::Idle {
            return;
        }
        match self.inner.storage.load().and_then(PersistedSession::restore) {
            Some(session) => {
                self.inner.bridge.set_presence(PRESENCE_TTL_DAYS);
                self.commit(session);
            }
            None => {
                self.inner.storage.clear();
                self.inner.bridge.clear_presence();
                self.commit(Session::signed_out(None));
            }
        }
    }

    /// Password login.
    ///
    /// The session passes through `loading` and always resolves: dropping the
    /// returned future early also resolves it to `unauthenticated`.
    /// Concurrent calls are not deduplicated.
    ///
    /// # Errors
    ///
    /// Returns the failure after recording it on the session.
    pub async fn login_with_credentials(&self, identifier: &str, secret: &str) -> Result<(), AuthError> {
        self.commit(Session::loading());
        let mut pending = LoadingGuard { store: self, armed: true };

        let request = LoginRequest { identifier: identifier.trim().to_owned(), secret: secret.to_owned() };
        let outcome = match self.inner.api.login(&request).await {
            Ok(resp) => resp.into_grant().map_err(AuthError::from),
            Err(err) => Err(err),
        };
        pending.armed = false;

        match outcome {
            Ok(grant) => {
                self.set_session(grant);
                Ok(())
            }
            Err(err) => {
                self.sign_out(Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Enter `authenticated` directly, e.g. after federated login completion.
    pub fn set_session(&self, grant: SessionGrant) {
        let session = Session::from_grant(grant);
        self.inner.storage.save(&PersistedSession::from(&session));
        self.inner.bridge.set_presence(PRESENCE_TTL_DAYS);
        self.commit(session);
    }

    /// Clear everything and announce `unauthenticated`.
    pub fn logout(&self) {
        self.sign_out(None);
    }

    /// Logout caused by a lapsed access token; leaves a message for the login page.
    pub fn expire(&self) {
        self.sign_out(Some(AuthError::Expired.to_string()));
    }

    /// Apply a refreshed token triple, but only if the session still holds
    /// the refresh token that was presented. A logout or a newer login that
    /// happened while the request was in flight wins. A renewal without a
    /// user keeps the current profile.
    pub(crate) fn apply_refresh(&self, presented: &str, renewal: TokenRenewal) -> bool {
        let session = {
            let mut state = lock(&self.inner.state);
            if state.status != AuthStatus::Authenticated || state.refresh_token.as_deref() != Some(presented) {
                return false;
            }
            let Some(user) = renewal.user.or_else(|| state.user.clone()) else {
                return false;
            };
            let session = Session::from_grant(SessionGrant {
                user,
                access_token: renewal.access_token,
                refresh_token: renewal.refresh_token,
                expires_at: renewal.expires_at,
            });
            self.inner.storage.save(&PersistedSession::from(&session));
            self.inner.bridge.set_presence(PRESENCE_TTL_DAYS);
            *state = session.clone();
            session
        };
        self.notify(&session);
        true
    }

    fn sign_out(&self, error: Option<String>) {
        self.inner.bridge.clear_presence();
        self.inner.storage.clear();
        self.commit(Session::signed_out(error));
    }

    fn commit(&self, next: Session) {
        *lock(&self.inner.state) = next.clone();
        self.notify(&next);
    }

    fn notify(&self, session: &Session) {
        let listeners: Vec<Listener> = lock(&self.inner.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(session);
        }
    }
}

/// Resolves a login that was abandoned mid-flight.
struct LoadingGuard<'a> {
    store: &'a SessionStore,
    armed: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed && self.store.status() == AuthStatus::Loading {
            self.store.sign_out(Some("login cancelled".to_owned()));
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
