//! HTTP-facing error type for the server.
//!
//! Handlers return [`AppError`]; its `IntoResponse` impl is the one place
//! authorization and login failures are turned into status codes. Internal
//! details are logged, never sent to the browser.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use portcullis_platform_access::AclError;
use rootcause::prelude::Report;
use std::fmt;

use crate::auth::{HandlerFailed, IdentityProviderError, LoginRequiredSignal};

/// Errors a request handler can end with.
#[derive(Debug)]
pub enum AppError {
    /// Authorization failed or was misused.
    Acl(AclError),
    /// The identity provider could not complete a login step.
    IdentityProvider(Report<IdentityProviderError>),
    /// The request itself is malformed.
    BadRequest(&'static str),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acl(err) => write!(f, "{err}"),
            Self::IdentityProvider(report) => write!(f, "{report}"),
            Self::BadRequest(reason) => write!(f, "bad request: {reason}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<AclError> for AppError {
    fn from(err: AclError) -> Self {
        Self::Acl(err)
    }
}

impl From<Report<IdentityProviderError>> for AppError {
    fn from(report: Report<IdentityProviderError>) -> Self {
        Self::IdentityProvider(report)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Acl(AclError::LoginRequired) => {
                tracing::debug!("login required");
                let mut response = (StatusCode::UNAUTHORIZED, "Login required").into_response();
                response.extensions_mut().insert(LoginRequiredSignal);
                response.extensions_mut().insert(HandlerFailed);
                return response;
            }
            Self::Acl(err @ AclError::Denied { .. }) => {
                tracing::warn!(error = %err, "access denied");
                (StatusCode::FORBIDDEN, "Forbidden")
            }
            Self::Acl(err) => {
                tracing::error!(error = %err, "authorization failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            Self::IdentityProvider(report) => {
                tracing::error!(error = %report, "identity provider failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed")
            }
            Self::BadRequest(reason) => {
                tracing::debug!(reason, "bad request");
                (StatusCode::BAD_REQUEST, "Bad request")
            }
        };

        let mut response = (status, message).into_response();
        response.extensions_mut().insert(HandlerFailed);
        response
    }
}
