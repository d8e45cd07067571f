//! Request authorization and login rules for portcullis.
//!
//! This crate provides:
//! - The per-request authorization state (`AuthorizationContext`)
//! - Permission evaluation against the policy service, or a local
//!   simulation driven by the `$$deny` query parameter (`PermissionEvaluator`)
//! - The authorization error taxonomy (`AclError`)
//! - Identity provider configuration and login redirect rules
//!
//! # Request lifecycle
//!
//! A context starts unchecked, accumulates declared permissions, and is
//! checked exactly once:
//!
//! ```
//! use portcullis_platform_access::{AuthorizationContext, PermissionEvaluator};
//!
//! # tokio_test_block(async {
//! let evaluator = PermissionEvaluator::simulated();
//! let mut ctx = AuthorizationContext::new("token");
//! ctx.declare("read");
//!
//! evaluator.check(&mut ctx, Some("$$deny=delete")).await.unwrap();
//!
//! assert!(ctx.has_permission("read"));
//! assert!(!ctx.has_permission("delete"));
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod context;
pub mod deployment;
pub mod error;
pub mod evaluator;
pub mod identity;
pub mod redirect;

// Re-export main types at crate root
pub use context::AuthorizationContext;
pub use deployment::DeploymentMode;
pub use error::AclError;
pub use evaluator::{DENY_PARAM, DenyList, PermissionEvaluator};
pub use identity::{IdentityProviderConfig, IdentityProviderConfigBuilder};
pub use redirect::{
    LOGIN_PATH, LOGOUT_PATH, callback_url, login_location, next_from_request, resolve_next,
};
