//! Policy service error types.

use std::fmt;

/// Errors from talking to the policy service.
///
/// `Unauthenticated` is kept apart from every transport failure because the
/// layer above turns it into a login redirect instead of an error page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The bearer token was missing, malformed or rejected.
    Unauthenticated {
        /// Status message reported by the service.
        details: String,
    },
    /// Failed to connect to the policy service.
    ConnectionFailed {
        /// Error details.
        details: String,
    },
    /// The policy service call failed for any other reason.
    RequestFailed {
        /// Error details.
        details: String,
    },
}

impl PolicyError {
    /// Returns true if the caller must log in again.
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated { .. })
    }
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated { details } => {
                write!(f, "policy service rejected credentials: {details}")
            }
            Self::ConnectionFailed { details } => {
                write!(f, "failed to connect to policy service: {details}")
            }
            Self::RequestFailed { details } => {
                write!(f, "policy check request failed: {details}")
            }
        }
    }
}

impl std::error::Error for PolicyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_is_distinguished() {
        let err = PolicyError::Unauthenticated {
            details: "empty token".to_string(),
        };
        assert!(err.is_unauthenticated());

        let err = PolicyError::RequestFailed {
            details: "unavailable".to_string(),
        };
        assert!(!err.is_unauthenticated());
    }

    #[test]
    fn display_includes_details() {
        let err = PolicyError::ConnectionFailed {
            details: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("connect"));
        assert!(err.to_string().contains("connection refused"));
    }
}
