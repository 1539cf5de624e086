//! # client
//!
//! Leptos + WASM frontend for the flood dashboard's access layer.
//!
//! This crate owns the authoritative half of the dual-channel trust model:
//! the session store (token lifecycle state machine), the presence-cookie
//! bridge the edge guard reads, the proactive refresh scheduler and the
//! client role guard mounted around every protected layout. Page bodies are
//! placeholders; only the access flow is implemented here.

pub mod app;
pub mod components;
pub mod error;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: hydrate the server-rendered shell.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
