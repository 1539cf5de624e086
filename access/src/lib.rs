//! Shared access-control model for the flood dashboard.
//!
//! This crate owns everything both enforcement points agree on: the role
//! vocabulary, the route protection table, the login/refresh wire shapes,
//! the unverified token codec and the open-redirect guard. It is used by
//! `server` (edge guard) and `client` (session store + role guard) and stays
//! free of any browser or runtime dependency.

pub mod check;
pub mod cookies;
pub mod redirect;
pub mod role;
pub mod routes;
pub mod token;
pub mod types;

pub use check::{AuthorizationCheck, Decision, Trust};
pub use role::{Role, RoleSet};
pub use token::{Claims, decode_claims};
pub use types::{GrantError, LoginRequest, RefreshRequest, SessionGrant, TokenRenewal, TokenResponse, User};
