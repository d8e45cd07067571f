//! Per-request authorization state.
//!
//! One `AuthorizationContext` is created per request by the enforcement
//! middleware and handed to the handler. The handler declares the permissions
//! it needs and runs exactly one check through a
//! [`PermissionEvaluator`](crate::PermissionEvaluator). After the check the
//! context answers membership queries.

use std::collections::BTreeSet;

use crate::error::AclError;
use crate::evaluator::DenyList;

/// Result of the single permission check a request may run.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Grants {
    /// No check has run yet.
    Unchecked,
    /// The policy service answered; exactly this set is granted.
    Remote(BTreeSet<String>),
    /// Local simulation; everything not on the deny-list is granted.
    Simulated(DenyList),
}

/// Authorization state of one in-flight request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationContext {
    /// Token from the session cookie. Empty means anonymous.
    bearer_token: String,
    /// Declared requirements, in declaration order.
    required: Vec<String>,
    grants: Grants,
}

impl AuthorizationContext {
    /// Creates a context for a caller presenting `bearer_token`.
    #[must_use]
    pub fn new(bearer_token: impl Into<String>) -> Self {
        Self {
            bearer_token: bearer_token.into(),
            required: Vec::new(),
            grants: Grants::Unchecked,
        }
    }

    /// Creates a context for a caller without a session cookie.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(String::new())
    }

    /// Returns the bearer token presented by the caller.
    #[must_use]
    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }

    /// Returns true if the caller presented a session token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.bearer_token.is_empty()
    }

    /// Adds a permission the handler requires.
    ///
    /// Nothing is evaluated until the check runs. Declaring after the check
    /// has no effect on its outcome.
    pub fn declare(&mut self, permission: impl Into<String>) {
        self.required.push(permission.into());
    }

    /// Returns the declared permissions in declaration order.
    #[must_use]
    pub fn required_permissions(&self) -> &[String] {
        &self.required
    }

    /// Returns true once the check ran to a success or a denial.
    #[must_use]
    pub fn is_checked(&self) -> bool {
        !matches!(self.grants, Grants::Unchecked)
    }

    /// Returns the set granted by the policy service, if it was consulted.
    #[must_use]
    pub fn granted_permissions(&self) -> Option<&BTreeSet<String>> {
        match &self.grants {
            Grants::Remote(granted) => Some(granted),
            _ => None,
        }
    }

    /// Returns true if `permission` is granted to the caller.
    ///
    /// # Panics
    ///
    /// Panics if the check has not run. Asking before checking is a bug in
    /// the handler, not a condition to recover from.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        match &self.grants {
            Grants::Unchecked => {
                panic!("check permissions before calling has_permission (\"{permission}\")")
            }
            Grants::Remote(granted) => granted.contains(permission),
            Grants::Simulated(deny) => !deny.contains(permission),
        }
    }

    /// Fails if the check already ran.
    pub(crate) fn ensure_unchecked(&self) -> Result<(), AclError> {
        if self.is_checked() {
            return Err(AclError::checked_twice());
        }
        Ok(())
    }

    pub(crate) fn finish_remote(&mut self, granted: impl IntoIterator<Item = String>) {
        self.grants = Grants::Remote(granted.into_iter().collect());
    }

    pub(crate) fn finish_simulated(&mut self, deny: DenyList) {
        self.grants = Grants::Simulated(deny);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_context_is_unchecked() {
        let ctx = AuthorizationContext::new("tok");
        assert!(!ctx.is_checked());
        assert!(ctx.is_authenticated());
        assert_eq!(ctx.bearer_token(), "tok");
        assert!(ctx.required_permissions().is_empty());
        assert!(ctx.granted_permissions().is_none());
    }

    #[test]
    fn anonymous_context_has_empty_token() {
        let ctx = AuthorizationContext::anonymous();
        assert!(!ctx.is_authenticated());
        assert_eq!(ctx.bearer_token(), "");
    }

    #[test]
    fn declarations_accumulate_in_order() {
        let mut ctx = AuthorizationContext::anonymous();
        ctx.declare("write");
        ctx.declare("read");
        ctx.declare("write");
        assert_eq!(ctx.required_permissions(), ["write", "read", "write"]);
        assert!(!ctx.is_checked());
    }

    #[test]
    #[should_panic(expected = "check permissions before calling has_permission")]
    fn has_permission_before_check_panics() {
        let mut ctx = AuthorizationContext::new("tok");
        ctx.declare("read");
        let _ = ctx.has_permission("read");
    }

    #[test]
    fn remote_grants_answer_membership_exactly() {
        let mut ctx = AuthorizationContext::new("tok");
        ctx.declare("read");
        ctx.finish_remote(["write".to_string(), "admin".to_string()]);

        assert!(ctx.is_checked());
        // The returned set is authoritative, not the declared list.
        assert!(!ctx.has_permission("read"));
        assert!(ctx.has_permission("write"));
        assert!(ctx.has_permission("admin"));
    }

    #[test]
    fn simulated_grants_allow_everything_not_denied() {
        let mut ctx = AuthorizationContext::anonymous();
        ctx.finish_simulated(DenyList::parse("delete"));

        assert!(ctx.has_permission("read"));
        assert!(!ctx.has_permission("delete"));
        assert!(ctx.granted_permissions().is_none());
    }

    #[test]
    fn ensure_unchecked_fails_after_finish() {
        let mut ctx = AuthorizationContext::anonymous();
        assert!(ctx.ensure_unchecked().is_ok());
        ctx.finish_remote(Vec::new());
        assert_eq!(ctx.ensure_unchecked(), Err(AclError::checked_twice()));
    }
}
