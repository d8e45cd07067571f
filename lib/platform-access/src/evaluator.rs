//! Permission evaluation strategies.
//!
//! The strategy is picked once at startup from the deployment mode. Local
//! development uses [`PermissionEvaluator::Simulated`], which never leaves the
//! process and lets a developer deny permissions through the `$$deny` query
//! parameter. Production uses [`PermissionEvaluator::Remote`], which asks the
//! policy service and ignores that parameter entirely.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use portcullis_authz::{CheckRequest, PolicyService};
use tracing::{debug, instrument, warn};

use crate::context::AuthorizationContext;
use crate::deployment::DeploymentMode;
use crate::error::AclError;

/// Query parameter listing permissions to simulate as denied.
pub const DENY_PARAM: &str = "$$deny";

/// Permissions a local request asked to have denied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DenyList(BTreeSet<String>);

impl DenyList {
    /// Parses a comma-separated list. Empty items are ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(str::trim)
                .filter(|perm| !perm.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Reads the deny-list from a raw (still encoded) query string.
    #[must_use]
    pub fn from_query(query: Option<&str>) -> Self {
        query
            .and_then(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .find(|(key, _)| key == DENY_PARAM)
                    .map(|(_, value)| Self::parse(&value))
            })
            .unwrap_or_default()
    }

    /// Returns true if `permission` is simulated as denied.
    #[must_use]
    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    /// Returns true if nothing is denied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the required permissions that this list denies.
    #[must_use]
    pub fn unmet(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|perm| self.contains(perm))
            .cloned()
            .collect()
    }
}

/// How permission checks are answered.
#[derive(Clone)]
pub enum PermissionEvaluator {
    /// Local development: grant everything not listed in `$$deny`.
    Simulated,
    /// Ask the policy service.
    Remote(Arc<dyn PolicyService>),
}

impl PermissionEvaluator {
    /// Creates a simulated evaluator.
    #[must_use]
    pub fn simulated() -> Self {
        Self::Simulated
    }

    /// Creates an evaluator backed by the policy service.
    #[must_use]
    pub fn remote(service: Arc<dyn PolicyService>) -> Self {
        Self::Remote(service)
    }

    /// Picks the strategy for `mode`.
    ///
    /// Local mode never consults `service`; production mode requires one.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if production mode has no policy service.
    pub fn for_mode(
        mode: DeploymentMode,
        service: Option<Arc<dyn PolicyService>>,
    ) -> Result<Self, AclError> {
        match (mode, service) {
            (DeploymentMode::Local, _) => Ok(Self::Simulated),
            (DeploymentMode::Production, Some(service)) => Ok(Self::Remote(service)),
            (DeploymentMode::Production, None) => Err(AclError::Configuration {
                reason: "production mode requires a policy service".to_string(),
            }),
        }
    }

    /// Returns true for the local simulation.
    #[must_use]
    pub fn is_simulated(&self) -> bool {
        matches!(self, Self::Simulated)
    }

    /// Runs the permission check for `ctx`.
    ///
    /// `query` is the raw query string of the request; only the simulated
    /// strategy reads it. On success or denial the context becomes checked.
    /// A login-required or transport failure leaves it unchecked.
    ///
    /// # Errors
    ///
    /// - `Protocol` if the context was already checked
    /// - `Denied` if a required permission is not granted
    /// - `LoginRequired` if the policy service rejects the token
    /// - `Transport` for any other policy service failure
    #[instrument(skip_all, fields(permissions = ?ctx.required_permissions()))]
    pub async fn check(
        &self,
        ctx: &mut AuthorizationContext,
        query: Option<&str>,
    ) -> Result<(), AclError> {
        ctx.ensure_unchecked()?;

        match self {
            Self::Simulated => {
                let deny = DenyList::from_query(query);
                debug!(
                    permissions = ?ctx.required_permissions(),
                    authenticated = ctx.is_authenticated(),
                    simulated_deny = ?deny,
                    "simulated permission check"
                );

                let unmet = deny.unmet(ctx.required_permissions());
                ctx.finish_simulated(deny);
                if !unmet.is_empty() {
                    return Err(AclError::permissions_required(unmet));
                }
                Ok(())
            }
            Self::Remote(service) => {
                let request =
                    CheckRequest::new(ctx.bearer_token(), ctx.required_permissions().to_vec());

                let reply = match service.check(request).await {
                    Ok(reply) => reply,
                    Err(report) if report.current_context().is_unauthenticated() => {
                        debug!("policy service requires login");
                        return Err(AclError::LoginRequired);
                    }
                    Err(report) => {
                        warn!(error = %report, "policy check failed");
                        return Err(AclError::Transport {
                            details: report.current_context().to_string(),
                        });
                    }
                };

                if !reply.can_access {
                    ctx.finish_remote(Vec::new());
                    return Err(AclError::permissions_required(
                        ctx.required_permissions().to_vec(),
                    ));
                }

                ctx.finish_remote(reply.permissions);
                Ok(())
            }
        }
    }
}

impl fmt::Debug for PermissionEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simulated => f.write_str("PermissionEvaluator::Simulated"),
            Self::Remote(_) => f.write_str("PermissionEvaluator::Remote"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use portcullis_authz::{CheckReply, PolicyError};
    use rootcause::prelude::Report;
    use std::sync::Mutex;

    /// Policy fake that records requests and answers with a fixed outcome.
    struct FakePolicy {
        outcome: Result<CheckReply, PolicyError>,
        calls: Mutex<Vec<CheckRequest>>,
    }

    impl FakePolicy {
        fn answering(outcome: Result<CheckReply, PolicyError>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<CheckRequest> {
            self.calls.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl PolicyService for FakePolicy {
        async fn check(&self, request: CheckRequest) -> Result<CheckReply, Report<PolicyError>> {
            self.calls.lock().expect("lock").push(request);
            self.outcome.clone().map_err(Report::from)
        }
    }

    fn context_requiring(token: &str, perms: &[&str]) -> AuthorizationContext {
        let mut ctx = AuthorizationContext::new(token);
        for perm in perms {
            ctx.declare(*perm);
        }
        ctx
    }

    #[test]
    fn deny_list_parses_and_skips_empty_items() {
        let deny = DenyList::parse("read,, write ,");
        assert!(deny.contains("read"));
        assert!(deny.contains("write"));
        assert!(!deny.contains(""));
    }

    #[test]
    fn deny_list_from_query_decodes_parameter() {
        let deny = DenyList::from_query(Some("page=2&%24%24deny=read%2Cwrite"));
        assert!(deny.contains("read"));
        assert!(deny.contains("write"));

        let deny = DenyList::from_query(Some("$$deny=delete"));
        assert!(deny.contains("delete"));

        assert!(DenyList::from_query(Some("page=2")).is_empty());
        assert!(DenyList::from_query(None).is_empty());
    }

    #[tokio::test]
    async fn simulated_denies_listed_permission() {
        let evaluator = PermissionEvaluator::simulated();
        let mut ctx = context_requiring("", &["read", "write"]);

        let err = evaluator
            .check(&mut ctx, Some("$$deny=write"))
            .await
            .unwrap_err();

        assert_eq!(err, AclError::permissions_required(vec!["write".to_string()]));
        assert!(ctx.is_checked());
        assert!(ctx.has_permission("read"));
        assert!(!ctx.has_permission("write"));
    }

    #[tokio::test]
    async fn simulated_grants_unlisted_permissions() {
        let evaluator = PermissionEvaluator::simulated();
        let mut ctx = context_requiring("", &["read"]);

        evaluator.check(&mut ctx, None).await.expect("granted");

        assert!(ctx.is_checked());
        assert!(ctx.has_permission("read"));
        assert!(ctx.has_permission("anything-else"));
    }

    #[tokio::test]
    async fn second_check_is_a_protocol_error() {
        let evaluator = PermissionEvaluator::simulated();
        let mut ctx = context_requiring("", &["read"]);
        evaluator.check(&mut ctx, None).await.expect("first check");

        let err = evaluator.check(&mut ctx, None).await.unwrap_err();
        assert_eq!(err, AclError::checked_twice());
    }

    #[tokio::test]
    async fn second_check_after_denial_is_a_protocol_error() {
        let evaluator = PermissionEvaluator::simulated();
        let mut ctx = context_requiring("", &["read"]);
        let _ = evaluator.check(&mut ctx, Some("$$deny=read")).await;

        let err = evaluator.check(&mut ctx, None).await.unwrap_err();
        assert!(matches!(err, AclError::Protocol { .. }));
    }

    #[tokio::test]
    async fn remote_sends_token_and_declared_permissions() {
        let policy = FakePolicy::answering(Ok(CheckReply::granted(["read"])));
        let evaluator = PermissionEvaluator::remote(policy.clone());
        let mut ctx = context_requiring("tok", &["read", "write"]);

        let _ = evaluator.check(&mut ctx, None).await;

        let calls = policy.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].bearer_token, "tok");
        assert_eq!(calls[0].permissions, vec!["read", "write"]);
    }

    #[tokio::test]
    async fn remote_grant_uses_returned_set() {
        let policy = FakePolicy::answering(Ok(CheckReply::granted(["read", "write"])));
        let evaluator = PermissionEvaluator::remote(policy);
        let mut ctx = context_requiring("tok", &["read"]);

        evaluator.check(&mut ctx, None).await.expect("granted");

        assert!(ctx.has_permission("read"));
        assert!(ctx.has_permission("write"));
        assert!(!ctx.has_permission("delete"));
    }

    #[tokio::test]
    async fn remote_ignores_deny_parameter() {
        let policy = FakePolicy::answering(Ok(CheckReply::granted(["read"])));
        let evaluator = PermissionEvaluator::remote(policy);
        let mut ctx = context_requiring("tok", &["read"]);

        evaluator
            .check(&mut ctx, Some("$$deny=read"))
            .await
            .expect("deny parameter must not apply in production");
        assert!(ctx.has_permission("read"));
    }

    #[tokio::test]
    async fn remote_denial_marks_checked_and_grants_nothing() {
        let mut reply = CheckReply::denied();
        reply.permissions = vec!["read".to_string()];
        let policy = FakePolicy::answering(Ok(reply));
        let evaluator = PermissionEvaluator::remote(policy);
        let mut ctx = context_requiring("tok", &["read", "write"]);

        let err = evaluator.check(&mut ctx, None).await.unwrap_err();

        assert_eq!(
            err,
            AclError::permissions_required(vec!["read".to_string(), "write".to_string()])
        );
        assert!(ctx.is_checked());
        assert!(!ctx.has_permission("read"));
        assert!(!ctx.has_permission("write"));
    }

    #[tokio::test]
    async fn rejected_token_requires_login_and_stays_unchecked() {
        let policy = FakePolicy::answering(Err(PolicyError::Unauthenticated {
            details: "empty token".to_string(),
        }));
        let evaluator = PermissionEvaluator::remote(policy);
        let mut ctx = context_requiring("", &["read"]);

        let err = evaluator.check(&mut ctx, None).await.unwrap_err();

        assert_eq!(err, AclError::LoginRequired);
        assert!(!ctx.is_checked());
    }

    #[tokio::test]
    async fn transport_failure_is_propagated() {
        let policy = FakePolicy::answering(Err(PolicyError::RequestFailed {
            details: "unavailable".to_string(),
        }));
        let evaluator = PermissionEvaluator::remote(policy);
        let mut ctx = context_requiring("tok", &["read"]);

        let err = evaluator.check(&mut ctx, None).await.unwrap_err();

        match err {
            AclError::Transport { details } => assert!(details.contains("unavailable")),
            other => panic!("expected transport error, got {other:?}"),
        }
        assert!(!ctx.is_checked());
    }

    #[test]
    fn for_mode_selects_strategy() {
        let policy: Arc<dyn PolicyService> =
            FakePolicy::answering(Ok(CheckReply::granted(["read"])));

        let local = PermissionEvaluator::for_mode(DeploymentMode::Local, Some(policy.clone()))
            .expect("local");
        assert!(local.is_simulated());

        let remote =
            PermissionEvaluator::for_mode(DeploymentMode::Production, Some(policy)).expect("prod");
        assert!(!remote.is_simulated());

        let missing = PermissionEvaluator::for_mode(DeploymentMode::Production, None);
        assert!(matches!(missing, Err(AclError::Configuration { .. })));
    }
}
