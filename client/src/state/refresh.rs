//! Proactive token refresh.
//!
//! DESIGN
//! ======
//! [`TokenRefresher::tick`] is one liveness check: if the access token is
//! within [`REFRESH_LEAD`] of expiry it trades the stored refresh token for
//! a new triple. At most one refresh is outstanding at a time; a tick that
//! arrives while one is pending is dropped, not queued, because the server
//! rotates refresh tokens and two interleaved calls would leave the store
//! holding a token the server already retired.
//!
//! [`RefreshScheduler`] owns the recurring task. It follows the session
//! status, not any component: it starts when the store announces
//! `authenticated` and aborts the task when the store leaves it, so no timer
//! keeps firing against a cleared session.
//!
//! TRADE-OFFS
//! ==========
//! A failed refresh leaves the session untouched. The next tick retries,
//! and the session validator signs out once the token actually lapses.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use futures::future::{AbortHandle, Abortable, LocalBoxFuture};

use super::session::{AuthStatus, SessionStore, SubscriptionId};
use crate::error::AuthError;

/// Time between liveness checks.
pub const REFRESH_PERIOD: std::time::Duration = std::time::Duration::from_secs(60);

/// Refresh once the access token is this close to expiry.
pub const REFRESH_LEAD: time::Duration = time::Duration::minutes(10);

/// Result of one liveness check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Not authenticated, or the token is not close to expiry.
    NotDue,
    /// Another refresh is outstanding; this tick was dropped.
    InFlight,
    Refreshed,
    /// The refresh succeeded but the session changed meanwhile; result discarded.
    Superseded,
    Failed(AuthError),
}

// =============================================================================
// SINGLE-FLIGHT REFRESH
// =============================================================================

/// Occupies the in-flight slot until dropped.
struct FlightSlot<'a>(&'a AtomicBool);

impl<'a> FlightSlot<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for FlightSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Performs refreshes against the store's API, one at a time.
#[derive(Clone)]
pub struct TokenRefresher {
    store: SessionStore,
    in_flight: Arc<AtomicBool>,
}

impl TokenRefresher {
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self { store, in_flight: Arc::new(AtomicBool::new(false)) }
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// One liveness check. Never signs the session out.
    pub async fn tick(&self) -> RefreshOutcome {
        let session = self.store.state();
        if session.status != AuthStatus::Authenticated
            || !session.is_token_expiring_soon_at(self.store.now(), REFRESH_LEAD)
        {
            return RefreshOutcome::NotDue;
        }
        let Some(presented) = session.refresh_token else {
            let err = AuthError::Refresh("no refresh token stored".to_owned());
            log::warn!("{err}");
            return RefreshOutcome::Failed(err);
        };
        let Some(_slot) = FlightSlot::acquire(&self.in_flight) else {
            log::debug!("refresh already in flight; skipping tick");
            return RefreshOutcome::InFlight;
        };

        match self.exchange(&presented).await {
            Ok(renewal) => {
                if self.store.apply_refresh(&presented, renewal) {
                    log::debug!("access token refreshed");
                    RefreshOutcome::Refreshed
                } else {
                    log::debug!("session changed during refresh; discarding result");
                    RefreshOutcome::Superseded
                }
            }
            Err(err) => {
                log::warn!("{err}");
                RefreshOutcome::Failed(err)
            }
        }
    }

    async fn exchange(&self, refresh_token: &str) -> Result<access::TokenRenewal, AuthError> {
        let api = self.store.api();
        let resp = api
            .refresh(refresh_token)
            .await
            .map_err(|err| AuthError::Refresh(err.to_string()))?;
        resp.into_renewal().map_err(|err| AuthError::Refresh(err.to_string()))
    }
}

// =============================================================================
// RUNTIME SEAM
// =============================================================================

/// Where the recurring task runs and how it waits.
pub trait Runtime: Send + Sync {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
    fn sleep(&self, period: std::time::Duration) -> LocalBoxFuture<'static, ()>;
}

/// Browser event loop. Outside the browser nothing is scheduled.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserRuntime;

impl Runtime for BrowserRuntime {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        #[cfg(feature = "hydrate")]
        wasm_bindgen_futures::spawn_local(task);
        #[cfg(not(feature = "hydrate"))]
        drop(task);
    }

    fn sleep(&self, period: std::time::Duration) -> LocalBoxFuture<'static, ()> {
        #[cfg(feature = "hydrate")]
        {
            Box::pin(gloo_timers::future::sleep(period))
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = period;
            Box::pin(futures::future::pending())
        }
    }
}

// =============================================================================
// SCHEDULER
// =============================================================================

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs [`TokenRefresher::tick`] immediately and then every period, for
/// exactly as long as the session is authenticated.
pub struct RefreshScheduler {
    store: SessionStore,
    refresher: TokenRefresher,
    runtime: Arc<dyn Runtime>,
    period: std::time::Duration,
    running: Mutex<Option<AbortHandle>>,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl RefreshScheduler {
    /// Follow `store` with the default period.
    pub fn attach(store: &SessionStore, runtime: Arc<dyn Runtime>) -> Arc<Self> {
        Self::attach_with_period(store, runtime, REFRESH_PERIOD)
    }

    pub fn attach_with_period(
        store: &SessionStore,
        runtime: Arc<dyn Runtime>,
        period: std::time::Duration,
    ) -> Arc<Self> {
        let scheduler = Arc::new(Self {
            store: store.clone(),
            refresher: TokenRefresher::new(store.clone()),
            runtime,
            period,
            running: Mutex::new(None),
            subscription: Mutex::new(None),
        });

        let weak: Weak<Self> = Arc::downgrade(&scheduler);
        let id = store.subscribe(move |session| {
            if let Some(scheduler) = weak.upgrade() {
                scheduler.sync(session.status);
            }
        });
        *lock(&scheduler.subscription) = Some(id);
        scheduler.sync(store.status());
        scheduler
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        lock(&self.running).is_some()
    }

    /// Start or stop the recurring task to match `status`.
    pub fn sync(&self, status: AuthStatus) {
        let mut running = lock(&self.running);
        let authenticated = status == AuthStatus::Authenticated;
        if authenticated && running.is_none() {
            let (handle, registration) = AbortHandle::new_pair();
            let task = run_loop(self.refresher.clone(), Arc::clone(&self.runtime), self.period);
            self.runtime.spawn(Box::pin(async move {
                let _ = Abortable::new(task, registration).await;
            }));
            *running = Some(handle);
            log::debug!("refresh scheduler started");
        } else if !authenticated && let Some(handle) = running.take() {
            handle.abort();
            log::debug!("refresh scheduler stopped");
        }
    }

    /// Stop following the store and cancel any running task.
    pub fn detach(&self) {
        if let Some(id) = lock(&self.subscription).take() {
            self.store.unsubscribe(id);
        }
        if let Some(handle) = lock(&self.running).take() {
            handle.abort();
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.detach();
    }
}

async fn run_loop(refresher: TokenRefresher, runtime: Arc<dyn Runtime>, period: std::time::Duration) {
    loop {
        refresher.tick().await;
        runtime.sleep(period).await;
    }
}

#[cfg(test)]
#[path = "refresh_test.rs"]
mod tests;
