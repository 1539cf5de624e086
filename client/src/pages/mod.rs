//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration (reading the session from
//! context, navigating on decisions) and delegates the decisions themselves
//! to `util` and `state`.

pub mod area;
pub mod callback;
pub mod forbidden;
pub mod login;
