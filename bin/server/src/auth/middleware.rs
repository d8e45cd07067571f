//! Permission enforcement middleware and extractor for Axum.
//!
//! [`require_acl`] wraps protected routes. It attaches a fresh
//! [`AuthorizationContext`] to every request, runs the handler, and then
//! either redirects to the login flow, passes the response through, or
//! rejects a handler that never checked its permissions.
//!
//! Handlers reach the context through the [`Acl`] extractor.

use axum::{
    extract::{FromRef, FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use portcullis_platform_access::{
    AclError, AuthorizationContext, PermissionEvaluator, login_location, next_from_request,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error};

use super::{AppState, cookies};
use crate::error::AppError;

/// Response extension marking a handler outcome of "login required".
///
/// Set by [`AppError`] and consumed by [`require_acl`]; never reaches the
/// browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginRequiredSignal;

/// Response extension marking a response produced from an [`AppError`].
///
/// Only such responses skip the checked-flag verification; a handler that
/// merely picks an error status is still held to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerFailed;

/// Request extension holding the context shared by middleware and handler.
///
/// Only the request's own task ever locks it, so the lock is never contended.
#[derive(Clone)]
struct AclHandle(Arc<Mutex<AuthorizationContext>>);

impl AclHandle {
    fn new(context: AuthorizationContext) -> Self {
        Self(Arc::new(Mutex::new(context)))
    }

    async fn is_checked(&self) -> bool {
        self.0.lock().await.is_checked()
    }
}

/// Enforces that every request through a protected route runs one
/// permission check.
///
/// Install with `axum::middleware::from_fn(require_acl)`.
pub async fn require_acl(
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if request.extensions().get::<AclHandle>().is_some() {
        return Err(AclError::attached_twice().into());
    }

    // A missing cookie leaves the token empty; the check decides what that means.
    let handle = AclHandle::new(AuthorizationContext::new(cookies::bearer_token(&jar)));
    request.extensions_mut().insert(handle.clone());

    let next_url = next_from_request(request.uri().path(), request.uri().query());

    let response = next.run(request).await;

    if response.extensions().get::<LoginRequiredSignal>().is_some() {
        debug!(next = %next_url, "login required, redirecting to login");
        return Ok(Redirect::to(&login_location(&next_url)).into_response());
    }

    if response.extensions().get::<HandlerFailed>().is_some() {
        return Ok(response);
    }

    if !handle.is_checked().await {
        error!(path = %next_url, "handler returned without checking permissions");
        return Err(AclError::unchecked_handler().into());
    }

    Ok(response)
}

/// Extractor giving a handler access to its request's authorization context.
///
/// Rejects with a configuration error if the route is not wrapped in
/// [`require_acl`].
pub struct Acl {
    context: AclHandle,
    evaluator: PermissionEvaluator,
    query: Option<String>,
}

impl<S> FromRequestParts<S> for Acl
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);

        let context = parts
            .extensions
            .get::<AclHandle>()
            .cloned()
            .ok_or_else(AclError::not_configured)?;

        Ok(Acl {
            context,
            evaluator: app_state.evaluator.clone(),
            query: parts.uri.query().map(str::to_string),
        })
    }
}

impl Acl {
    /// Declares a permission the handler needs.
    pub async fn declare(&self, permission: impl Into<String>) {
        self.context.0.lock().await.declare(permission);
    }

    /// Runs the permission check for everything declared so far.
    ///
    /// # Errors
    ///
    /// See [`PermissionEvaluator::check`].
    pub async fn check(&self) -> Result<(), AclError> {
        let mut context = self.context.0.lock().await;
        self.evaluator
            .check(&mut context, self.query.as_deref())
            .await
    }

    /// Declares every permission in `permissions` and runs the check.
    ///
    /// # Errors
    ///
    /// See [`PermissionEvaluator::check`].
    pub async fn require<I, P>(&self, permissions: I) -> Result<(), AclError>
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        {
            let mut context = self.context.0.lock().await;
            for permission in permissions {
                context.declare(permission);
            }
        }
        self.check().await
    }

    /// Returns true if `permission` is granted.
    ///
    /// # Panics
    ///
    /// Panics if called before the check ran.
    pub async fn has_permission(&self, permission: &str) -> bool {
        self.context.0.lock().await.has_permission(permission)
    }
}
