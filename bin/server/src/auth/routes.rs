//! Authentication routes for login and logout.
//!
//! `/accounts/login` is both the entry point and the OAuth callback: a
//! request carrying `code` completes a login, anything else starts one.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, Uri, header},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use portcullis_core::LoginState;
use portcullis_platform_access::{AclError, callback_url, resolve_next};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{AppState, cookies, identity::AuthorizeRequest};
use crate::error::AppError;

/// Query parameters accepted by the login entry point.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    next: Option<String>,
    code: Option<String>,
    state: Option<String>,
    prompt: Option<String>,
}

/// Starts or completes a login.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
    Query(query): Query<LoginQuery>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let host = request_host(&headers, &uri)?;
    let redirect_uri = callback_url(host, query.next.as_deref().unwrap_or_default());

    match query.code.as_deref() {
        Some(code) => complete_login(&state, jar, &query, code, &redirect_uri).await,
        None => begin_login(&state, jar, &query, &redirect_uri),
    }
}

fn begin_login(
    state: &AppState,
    jar: CookieJar,
    query: &LoginQuery,
    redirect_uri: &str,
) -> Result<Response, AppError> {
    let login_state = LoginState::generate();
    let authorize_url = state.identity_provider.authorization_url(&AuthorizeRequest {
        redirect_uri: redirect_uri.to_string(),
        state: login_state.to_string(),
        force_login: query.prompt.as_deref() == Some("login"),
    })?;

    debug!("redirecting to identity provider");
    let jar = jar.add(cookies::login_state(&login_state));
    Ok((jar, Redirect::to(&authorize_url)).into_response())
}

async fn complete_login(
    state: &AppState,
    jar: CookieJar,
    query: &LoginQuery,
    code: &str,
    redirect_uri: &str,
) -> Result<Response, AppError> {
    let token = state
        .identity_provider
        .exchange_code(code, redirect_uri)
        .await?;

    let next = resolve_next(query.next.as_deref());

    let Some(issued) = cookies::issued_login_state(&jar) else {
        // Nothing to compare against: the browser did not start this login.
        warn!("login callback without login state cookie, session not established");
        return Ok(Redirect::to(&next).into_response());
    };

    let jar = jar.add(cookies::clear_login_state());

    if query.state.as_deref() != Some(issued.as_str()) {
        warn!("login callback state does not match issued state");
        return Ok((jar, AppError::from(AclError::bad_state())).into_response());
    }

    info!("login completed");
    let jar = jar.add(cookies::session(&token));
    Ok((jar, Redirect::to(&next)).into_response())
}

/// Clears the session and sends the browser through provider logout.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let return_to = if state.mode.is_local() {
        format!("https://{}/", request_host(&headers, &uri)?)
    } else {
        state.post_logout_redirect_uri.clone()
    };

    let jar = jar.add(cookies::clear_session());
    let location = state.identity_provider.logout_url(&return_to);
    Ok((jar, Redirect::to(&location)).into_response())
}

/// Host the request was addressed to. HTTP/2 carries it in the URI
/// authority rather than a `Host` header.
fn request_host<'a>(headers: &'a HeaderMap, uri: &'a Uri) -> Result<&'a str, AppError> {
    headers
        .get(header::HOST)
        .and_then(|host| host.to_str().ok())
        .or_else(|| uri.authority().map(|authority| authority.as_str()))
        .filter(|host| !host.is_empty())
        .ok_or(AppError::BadRequest("missing host"))
}
