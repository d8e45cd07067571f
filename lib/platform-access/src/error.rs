//! Error types for request authorization.
//!
//! `AclError` is the single taxonomy every authorization failure is
//! classified into before it leaves this crate:
//! - `Configuration` / `Protocol`: programmer misuse, never shown to users
//! - `LoginRequired`: control signal that sends the caller to the login flow
//! - `Denied`: the user-visible "forbidden" outcome
//! - `Transport`: the policy service could not be consulted

use std::fmt;

/// Errors from authorization checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AclError {
    /// Authorization is not wired correctly for the handler.
    Configuration { reason: String },
    /// The authorization protocol was driven out of order.
    Protocol { reason: String },
    /// The caller has no valid session and must log in.
    LoginRequired,
    /// Access was refused.
    Denied {
        reason: String,
        /// Permissions involved in the refusal, for diagnostics.
        permissions: Vec<String>,
    },
    /// The policy service failed for a reason other than credentials.
    Transport { details: String },
}

impl AclError {
    /// Authorization is not configured for the handler at hand.
    #[must_use]
    pub fn not_configured() -> Self {
        Self::Configuration {
            reason: "authorization not configured for this handler".to_string(),
        }
    }

    /// The handler finished without running a permission check.
    #[must_use]
    pub fn unchecked_handler() -> Self {
        Self::Configuration {
            reason: "handler did not declare/check any authorization".to_string(),
        }
    }

    /// A second check was attempted on the same request.
    #[must_use]
    pub fn checked_twice() -> Self {
        Self::Protocol {
            reason: "check invoked twice".to_string(),
        }
    }

    /// Authorization state was attached to a request that already had one.
    #[must_use]
    pub fn attached_twice() -> Self {
        Self::Protocol {
            reason: "authorization context attached twice".to_string(),
        }
    }

    /// The listed permissions are required and were not granted.
    #[must_use]
    pub fn permissions_required(permissions: Vec<String>) -> Self {
        Self::Denied {
            reason: "permissions required".to_string(),
            permissions,
        }
    }

    /// The login callback carried a state that does not match the cookie.
    #[must_use]
    pub fn bad_state() -> Self {
        Self::Denied {
            reason: "bad state".to_string(),
            permissions: Vec::new(),
        }
    }

    /// Returns true for the login-required control signal.
    #[must_use]
    pub fn is_login_required(&self) -> bool {
        matches!(self, Self::LoginRequired)
    }
}

impl fmt::Display for AclError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { reason } => write!(f, "acl misconfigured: {reason}"),
            Self::Protocol { reason } => write!(f, "acl protocol violation: {reason}"),
            Self::LoginRequired => write!(f, "acl: requires login"),
            Self::Denied {
                reason,
                permissions,
            } => {
                if permissions.is_empty() {
                    write!(f, "access denied: {reason}")
                } else {
                    write!(f, "access denied: {reason}: {}", permissions.join(", "))
                }
            }
            Self::Transport { details } => write!(f, "policy service unavailable: {details}"),
        }
    }
}

impl std::error::Error for AclError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_display_lists_permissions() {
        let err = AclError::permissions_required(vec!["read".to_string(), "write".to_string()]);
        assert_eq!(
            err.to_string(),
            "access denied: permissions required: read, write"
        );
    }

    #[test]
    fn bad_state_display() {
        assert_eq!(AclError::bad_state().to_string(), "access denied: bad state");
    }

    #[test]
    fn configuration_display() {
        let err = AclError::not_configured();
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn only_login_required_is_the_login_signal() {
        assert!(AclError::LoginRequired.is_login_required());
        assert!(!AclError::checked_twice().is_login_required());
        assert!(!AclError::bad_state().is_login_required());
    }
}
