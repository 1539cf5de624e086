//! Shared application state.
//!
//! DESIGN
//! ======
//! The edge is stateless per request: `AppState` only carries configuration
//! and the guard built from it. It is cloned into every request.

use std::sync::Arc;

use crate::config::EdgeConfig;
use crate::routes::guard::EdgeGuard;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EdgeConfig>,
    pub guard: EdgeGuard,
}

impl AppState {
    #[must_use]
    pub fn new(config: EdgeConfig) -> Self {
        let guard = EdgeGuard::new(config.bearer_roles);
        Self { config: Arc::new(config), guard }
    }
}
