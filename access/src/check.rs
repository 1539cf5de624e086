//! Authorization capability shared by both enforcement points.
//!
//! ARCHITECTURE
//! ============
//! Two implementations exist and run in sequence: the edge guard (coarse,
//! cookie and unverified-token hints only) and the client role guard
//! (authoritative, reads the user object from the login response). They run
//! in different processes with different data visibility and must never be
//! merged into one check.

use crate::role::Role;
use crate::routes::{forbidden_target, login_target};

/// How much a check's verdict can be relied upon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trust {
    /// Works from hints a client can forge; only useful to stop anonymous traffic.
    Coarse,
    /// Works from the verified identity payload.
    Authoritative,
}

/// Outcome of one authorization check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Access granted.
    Allow,
    /// The check lacks the data to decide; a later, stronger check decides.
    Defer,
    /// The subject is still being established (session hydrating or logging in).
    Pending,
    /// No session; send the visitor to login, remembering where they were going.
    RedirectLogin { next: String },
    /// Authenticated but lacking every role the area accepts.
    Forbidden { required: Vec<Role> },
}

impl Decision {
    /// Whether the request may proceed past this check.
    #[must_use]
    pub fn passes(&self) -> bool {
        matches!(self, Self::Allow | Self::Defer)
    }

    /// Navigation target for the redirect variants.
    #[must_use]
    pub fn redirect_target(&self) -> Option<String> {
        match self {
            Self::RedirectLogin { next } => Some(login_target(next)),
            Self::Forbidden { required } => Some(forbidden_target(required)),
            Self::Allow | Self::Defer | Self::Pending => None,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Defer => "defer",
            Self::Pending => "pending",
            Self::RedirectLogin { .. } => "redirect_login",
            Self::Forbidden { .. } => "forbidden",
        }
    }
}

/// One enforcement point.
pub trait AuthorizationCheck {
    /// What the check can see about the visitor.
    type Subject: ?Sized;

    fn trust(&self) -> Trust;

    /// Decide whether `subject` may reach `path`.
    fn check(&self, path: &str, subject: &Self::Subject) -> Decision;
}
