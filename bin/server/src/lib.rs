//! portcullis web server.
//!
//! This crate wires the login flow and the permission enforcement
//! middleware into an Axum router.

pub mod auth;
pub mod config;
pub mod error;
pub mod pages;

use axum::{Router, middleware::from_fn, routing::get};
use portcullis_platform_access::{LOGIN_PATH, LOGOUT_PATH};
use std::sync::Arc;

use auth::AppState;

/// Builds the application router.
///
/// Pages are wrapped in [`auth::require_acl`]; the account routes are not,
/// since they are how a caller obtains a session in the first place.
pub fn router(state: Arc<AppState>) -> Router {
    let pages = Router::new()
        .route("/", get(pages::dashboard))
        .route_layer(from_fn(auth::require_acl));

    Router::new()
        .merge(pages)
        .route(LOGIN_PATH, get(auth::login))
        .route(LOGOUT_PATH, get(auth::logout))
        .with_state(state)
}
