use std::sync::atomic::AtomicUsize;

use access::Role;
use futures::executor::block_on;

use super::*;
use crate::state::storage::MemoryStorage;
use crate::state::test_helpers::{Harness, now, rejected, token_response};

fn statuses(harness: &Harness) -> Arc<Mutex<Vec<AuthStatus>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    harness.store.subscribe(move |session| sink.lock().unwrap().push(session.status));
    seen
}

// =============================================================================
// LOGIN
// =============================================================================

#[test]
fn login_success_passes_through_loading() {
    let h = Harness::new();
    let seen = statuses(&h);
    h.api.push_login(Ok(token_response("a-1", "r-1", Duration::hours(1), &[Role::Admin])));

    block_on(h.store.login_with_credentials("  ops  ", "pw")).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![AuthStatus::Loading, AuthStatus::Authenticated]);
    let session = h.store.state();
    assert!(session.is_authenticated());
    assert_eq!(session.access_token.as_deref(), Some("a-1"));
    assert_eq!(session.refresh_token.as_deref(), Some("r-1"));
    assert!(session.error.is_none());
    assert!(h.has_presence());
    assert!(h.storage.raw().is_some());
}

#[test]
fn login_rejection_records_message() {
    let h = Harness::new();
    h.api.push_login(Ok(rejected("bad credentials")));

    let err = block_on(h.store.login_with_credentials("ops", "nope")).unwrap_err();

    assert_eq!(err, AuthError::Credentials("bad credentials".to_owned()));
    let session = h.store.state();
    assert_eq!(session.status, AuthStatus::Unauthenticated);
    assert!(session.user.is_none());
    assert!(session.access_token.is_none());
    assert_eq!(session.error.as_deref(), Some("bad credentials"));
    assert!(!h.has_presence());
}

#[test]
fn login_transport_failure_never_sticks_in_loading() {
    let h = Harness::new();
    // Nothing scripted: the mock answers with a transport error.
    let err = block_on(h.store.login_with_credentials("ops", "pw")).unwrap_err();
    assert!(matches!(err, AuthError::Transport(_)));
    assert_eq!(h.store.status(), AuthStatus::Unauthenticated);
    assert!(h.store.state().error.is_some());
}

#[test]
fn login_with_incomplete_success_is_rejected() {
    let h = Harness::new();
    let mut resp = token_response("a-1", "r-1", Duration::hours(1), &[Role::Admin]);
    resp.refresh_token = None;
    h.api.push_login(Ok(resp));

    let err = block_on(h.store.login_with_credentials("ops", "pw")).unwrap_err();
    assert!(matches!(err, AuthError::Incomplete(_)));
    assert_eq!(h.store.status(), AuthStatus::Unauthenticated);
    assert!(h.storage.raw().is_none());
}

#[test]
fn relogin_after_failure_clears_error() {
    let h = Harness::new();
    h.api.push_login(Ok(rejected("bad credentials")));
    h.api.push_login(Ok(token_response("a-2", "r-2", Duration::hours(1), &[Role::Authority])));

    assert!(block_on(h.store.login_with_credentials("ops", "nope")).is_err());
    block_on(h.store.login_with_credentials("ops", "pw")).unwrap();

    let session = h.store.state();
    assert_eq!(session.status, AuthStatus::Authenticated);
    assert!(session.error.is_none());
    assert!(session.has_role(Role::Authority));
    assert_eq!(h.api.login_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn login_while_authenticated_clears_old_tokens_during_loading() {
    let h = Harness::new();
    h.login_as(&[Role::Admin], Duration::hours(1));
    h.api.push_login(Ok(token_response("a-2", "r-2", Duration::hours(1), &[Role::Admin])));

    let during_loading = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&during_loading);
    h.store.subscribe(move |session| {
        if session.status == AuthStatus::Loading {
            *sink.lock().unwrap() = Some(session.clone());
        }
    });

    block_on(h.store.login_with_credentials("ops", "pw")).unwrap();

    let loading = during_loading.lock().unwrap().clone().unwrap();
    assert!(loading.user.is_none());
    assert!(loading.access_token.is_none());
    assert_eq!(h.store.state().access_token.as_deref(), Some("a-2"));
}

#[test]
fn abandoned_login_resolves_to_unauthenticated() {
    let h = Harness::new();
    h.api.push_login(Ok(token_response("a-1", "r-1", Duration::hours(1), &[Role::Admin])));
    let gate = h.api.hold_next_login();
    {
        let mut login = Box::pin(h.store.login_with_credentials("ops", "pw"));
        let waker = futures::task::noop_waker();
        let mut cx = std::task::Context::from_waker(&waker);
        assert!(login.as_mut().poll(&mut cx).is_pending());
        assert_eq!(h.store.status(), AuthStatus::Loading);
    }
    drop(gate);

    let session = h.store.state();
    assert_eq!(session.status, AuthStatus::Unauthenticated);
    assert_eq!(session.error.as_deref(), Some("login cancelled"));
    assert!(!h.has_presence());
}

// =============================================================================
// EXPIRY
// =============================================================================

#[test]
fn token_expired_exactly_at_expiry() {
    let h = Harness::new();
    h.login_as(&[Role::Admin], Duration::minutes(30));
    assert!(!h.store.is_token_expired());

    h.set_now(now() + Duration::minutes(30) - Duration::seconds(1));
    assert!(!h.store.is_token_expired());

    h.set_now(now() + Duration::minutes(30));
    assert!(h.store.is_token_expired());
}

#[test]
fn missing_expiry_counts_as_expired() {
    let session = Session { status: AuthStatus::Authenticated, ..Session::default() };
    assert!(session.is_token_expired_at(now()));
    assert!(!session.is_token_expiring_soon_at(now(), Duration::minutes(10)));
}

#[test]
fn expiring_soon_window_is_inclusive() {
    let h = Harness::new();
    h.login_as(&[Role::Admin], Duration::minutes(11));
    assert!(!h.store.is_token_expiring_soon(Duration::minutes(10)));

    h.advance(Duration::minutes(1));
    assert!(h.store.is_token_expiring_soon(Duration::minutes(10)));

    h.advance(Duration::minutes(20));
    assert!(h.store.is_token_expiring_soon(Duration::minutes(10)));
}

#[test]
fn expire_signs_out_with_message() {
    let h = Harness::new();
    h.login_as(&[Role::Authority], Duration::minutes(5));
    h.store.expire();

    let session = h.store.state();
    assert_eq!(session.status, AuthStatus::Unauthenticated);
    assert_eq!(session.error, Some(AuthError::Expired.to_string()));
    assert!(h.storage.raw().is_none());
    assert!(!h.has_presence());
}

// =============================================================================
// LOGOUT
// =============================================================================

#[test]
fn logout_clears_storage_and_cookie_before_announcing() {
    let h = Harness::new();
    h.login_as(&[Role::SuperAdmin], Duration::hours(1));

    let observed = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&observed);
    let storage = Arc::clone(&h.storage);
    let cookies = Arc::clone(&h.cookies);
    h.store.subscribe(move |session| {
        let cookie = cookies.get(access::cookies::PRESENCE_COOKIE);
        *sink.lock().unwrap() = Some((session.status, storage.raw(), cookie));
    });

    h.store.logout();

    let (status, raw, cookie) = observed.lock().unwrap().clone().unwrap();
    assert_eq!(status, AuthStatus::Unauthenticated);
    assert!(raw.is_none());
    assert!(cookie.is_none());
    assert!(h.store.state().error.is_none());
}

#[test]
fn logout_when_signed_out_is_harmless() {
    let h = Harness::new();
    h.store.logout();
    h.store.logout();
    assert_eq!(h.store.status(), AuthStatus::Unauthenticated);
}

// =============================================================================
// HYDRATE
// =============================================================================

fn persisted_record(status: &str) -> String {
    format!(
        r#"{{"status":"{status}","user":{{"id":"u1","email":"ops@example.org","roles":["ADMIN"]}},
            "accessToken":"a-9","refreshToken":"r-9","expiresAt":"2026-10-16T13:00:00Z"}}"#
    )
}

#[test]
fn hydrate_restores_authenticated_record_and_presence() {
    let h = Harness::with_storage(MemoryStorage::with_raw(&persisted_record("authenticated")));
    h.store.hydrate();

    let session = h.store.state();
    assert!(session.is_authenticated());
    assert_eq!(session.refresh_token.as_deref(), Some("r-9"));
    assert!(session.has_role(Role::Admin));
    assert!(h.has_presence());
}

#[test]
fn hydrate_discards_mid_login_record() {
    let h = Harness::with_storage(MemoryStorage::with_raw(&persisted_record("loading")));
    h.store.hydrate();
    assert_eq!(h.store.status(), AuthStatus::Unauthenticated);
    assert!(h.storage.raw().is_none());
    assert!(!h.has_presence());
}

#[test]
fn hydrate_with_empty_storage_signs_out() {
    let h = Harness::new();
    h.store.hydrate();
    assert_eq!(h.store.status(), AuthStatus::Unauthenticated);
}

#[test]
fn hydrate_only_acts_from_idle() {
    let h = Harness::new();
    h.login_as(&[Role::Admin], Duration::hours(1));
    h.store.hydrate();
    assert!(h.store.state().is_authenticated());
}

// =============================================================================
// SUBSCRIPTIONS AND REFRESH APPLICATION
// =============================================================================

#[test]
fn unsubscribed_listener_stops_receiving() {
    let h = Harness::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let id = h.store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    h.store.logout();
    h.store.unsubscribe(id);
    h.store.logout();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn listener_may_read_store_during_notification() {
    let h = Harness::new();
    let store = h.store.clone();
    let seen = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&seen);
    h.store.subscribe(move |_| *sink.lock().unwrap() = Some(store.status()));
    h.store.logout();
    assert_eq!(*seen.lock().unwrap(), Some(AuthStatus::Unauthenticated));
}

#[test]
fn refresh_applies_only_to_presented_token() {
    let h = Harness::new();
    h.login_as(&[Role::Admin], Duration::minutes(5));
    let grant = token_response("a-2", "r-2", Duration::hours(1), &[Role::Admin]).into_renewal().unwrap();

    assert!(!h.store.apply_refresh("someone-else", grant.clone()));
    assert_eq!(h.store.state().access_token.as_deref(), Some("access-1"));

    assert!(h.store.apply_refresh("refresh-1", grant));
    let session = h.store.state();
    assert_eq!(session.access_token.as_deref(), Some("a-2"));
    assert_eq!(session.refresh_token.as_deref(), Some("r-2"));
    assert_eq!(session.expires_at, Some(now() + Duration::hours(1)));
}

#[test]
fn refresh_after_logout_is_dropped() {
    let h = Harness::new();
    h.login_as(&[Role::Admin], Duration::minutes(5));
    h.store.logout();
    let grant = token_response("a-2", "r-2", Duration::hours(1), &[Role::Admin]).into_renewal().unwrap();
    assert!(!h.store.apply_refresh("refresh-1", grant));
    assert_eq!(h.store.status(), AuthStatus::Unauthenticated);
    assert!(h.storage.raw().is_none());
    assert!(!h.has_presence());
}
