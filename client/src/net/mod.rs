//! Networking modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` talks to the identity backend (login, refresh). Wire types live in
//! the shared `access` crate so the edge server parses the same shapes.

pub mod api;
