//! Protected pages of the application.
//!
//! Every page here sits behind [`require_acl`](crate::auth::require_acl)
//! and checks its own permissions through the [`Acl`](crate::auth::Acl)
//! extractor.

pub mod dashboard;

pub use dashboard::{DashboardView, dashboard};
