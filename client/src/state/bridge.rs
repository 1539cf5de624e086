//! Session bridge: mirrors "a session exists" into a cookie the edge can read.
//!
//! SYSTEM CONTEXT
//! ==============
//! The edge guard cannot see `localStorage`, so the store tells it about a
//! session through the `fda_session` presence cookie. The cookie carries an
//! opaque marker only, never token material. The store calls
//! [`SessionBridge::set_presence`] before announcing an authenticated state
//! and [`SessionBridge::clear_presence`] before announcing a signed-out one,
//! so a redirect triggered by that announcement always sees a matching cookie.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use access::cookies::{PRESENCE_COOKIE, ROLES_COOKIE, expired_cookie, presence_cookie};

/// Sink for raw `document.cookie` assignments.
pub trait CookieWriter: Send + Sync {
    fn write(&self, assignment: &str);

    /// Whether cookies should carry `Secure` (https origin).
    fn secure_context(&self) -> bool {
        false
    }
}

/// Writes through `document.cookie`. No-ops outside the browser.
#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentCookies;

impl CookieWriter for DocumentCookies {
    fn write(&self, assignment: &str) {
        #[cfg(feature = "hydrate")]
        {
            use wasm_bindgen::JsCast;
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Ok(html) = document.dyn_into::<web_sys::HtmlDocument>() {
                let _ = html.set_cookie(assignment);
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = assignment;
        }
    }

    fn secure_context(&self) -> bool {
        #[cfg(feature = "hydrate")]
        {
            web_sys::window()
                .and_then(|w| w.location().protocol().ok())
                .is_some_and(|protocol| protocol == "https:")
        }
        #[cfg(not(feature = "hydrate"))]
        {
            false
        }
    }
}

/// Cookie jar that interprets assignments in memory, for SSR and tests.
#[derive(Debug, Default)]
pub struct MemoryCookies {
    jar: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<String>>,
}

impl MemoryCookies {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.jar.lock().unwrap_or_else(PoisonError::into_inner).get(name).cloned()
    }

    /// Every assignment written so far, oldest first.
    #[must_use]
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl CookieWriter for MemoryCookies {
    fn write(&self, assignment: &str) {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(assignment.to_owned());

        let mut attrs = assignment.split(';').map(str::trim);
        let Some((name, value)) = attrs.next().and_then(|pair| pair.split_once('=')) else {
            return;
        };
        let expired = attrs.any(|attr| attr.eq_ignore_ascii_case("Max-Age=0"));
        let mut jar = self.jar.lock().unwrap_or_else(PoisonError::into_inner);
        if expired {
            jar.remove(name);
        } else {
            jar.insert(name.to_owned(), value.to_owned());
        }
    }
}

/// Owner of the presence cookie. Only the session store calls into it.
#[derive(Clone)]
pub struct SessionBridge {
    writer: Arc<dyn CookieWriter>,
}

impl SessionBridge {
    #[must_use]
    pub fn new(writer: Arc<dyn CookieWriter>) -> Self {
        Self { writer }
    }

    /// Write the presence marker with a bounded lifetime.
    pub fn set_presence(&self, ttl_days: u32) {
        let secure = self.writer.secure_context();
        self.writer.write(&presence_cookie(ttl_days, secure));
    }

    /// Remove the presence marker and any stale role hint.
    pub fn clear_presence(&self) {
        self.writer.write(&expired_cookie(PRESENCE_COOKIE));
        self.writer.write(&expired_cookie(ROLES_COOKIE));
    }
}

#[cfg(test)]
#[path = "bridge_test.rs"]
mod tests;
