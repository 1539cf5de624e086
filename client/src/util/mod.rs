//! Helpers shared across pages and components.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pure access logic lives here so pages stay thin and the decisions can be
//! tested without a browser.

pub mod auth;
pub mod callback;
