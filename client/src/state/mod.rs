//! Client-side session state.
//!
//! DESIGN
//! ======
//! `session` is the authoritative record and its transitions; `storage` and
//! `bridge` are the two places the record is mirrored (durable storage for
//! secrets, presence cookie for the edge); `refresh` keeps the token pair
//! alive while the session is authenticated.

pub mod bridge;
pub mod refresh;
pub mod session;
pub mod storage;

use std::sync::Arc;

use bridge::{DocumentCookies, SessionBridge};
use session::SessionStore;
use storage::BrowserStorage;

use crate::net::api::HttpAuthApi;

/// Store wired to the browser: HTTP identity API, `localStorage`, `document.cookie`.
#[must_use]
pub fn browser_store() -> SessionStore {
    SessionStore::new(
        Arc::new(HttpAuthApi::default()),
        Arc::new(BrowserStorage),
        SessionBridge::new(Arc::new(DocumentCookies)),
    )
}

// =============================================================================
// TEST HELPERS
// =============================================================================
