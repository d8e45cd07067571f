//! Authentication and authorization for the portcullis server.
//!
//! This module provides:
//! - The OAuth2 login and logout flow against an external identity provider
//! - The cookies that carry login state and the session token
//! - The [`require_acl`] middleware and [`Acl`] extractor that enforce a
//!   permission check on every protected request
//!
//! # Authorization Model
//!
//! The session cookie holds an opaque bearer token. This server never
//! interprets it: every protected request forwards it, together with the
//! permissions the handler declared, to the policy service, which answers
//! with the subset granted. In local deployments the policy service is
//! replaced by a simulation that grants everything except what the request's
//! `$$deny` parameter names.

pub mod cookies;
pub mod identity;
pub mod middleware;
pub mod routes;

use portcullis_platform_access::{DeploymentMode, PermissionEvaluator};
use std::sync::Arc;

pub use identity::{IdentityProvider, IdentityProviderError, OAuthIdentityProvider};
pub use middleware::{Acl, HandlerFailed, LoginRequiredSignal, require_acl};
pub use routes::{login, logout};

/// Shared application state.
pub struct AppState {
    /// Deployment mode the server runs in.
    pub mode: DeploymentMode,
    /// Permission evaluation strategy, chosen once at startup.
    pub evaluator: PermissionEvaluator,
    /// Identity provider for login and logout.
    pub identity_provider: Arc<dyn IdentityProvider>,
    /// Where the provider returns the browser after logout in production.
    pub post_logout_redirect_uri: String,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        mode: DeploymentMode,
        evaluator: PermissionEvaluator,
        identity_provider: Arc<dyn IdentityProvider>,
        post_logout_redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            mode,
            evaluator,
            identity_provider,
            post_logout_redirect_uri: post_logout_redirect_uri.into(),
        }
    }
}
