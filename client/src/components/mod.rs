//! Reusable UI components.

pub mod role_guard;
