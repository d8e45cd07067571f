//! Identifier types.
//!
//! The login state is the one-time CSRF value that travels in the
//! `login-state` cookie and in the `state` parameter of the authorize URL.
//! It uses ULID so values are unique and sortable by issue time.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// CSRF state for a single login round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoginState(Ulid);

impl LoginState {
    /// Generates a fresh, unique login state.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Returns the underlying ULID.
    #[must_use]
    pub const fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl fmt::Display for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
