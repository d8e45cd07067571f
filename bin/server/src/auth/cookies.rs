//! The two cookies the login flow depends on.
//!
//! - `login-state`: CSRF state for one login round trip. HTTP-only, scoped
//!   to the accounts routes, short-lived, cleared when the callback consumes it.
//! - `token`: the bearer session token. Its expiry mirrors the token's own.
//!   Not HTTP-only so client-side code can read it.
//!
//! Every cookie written here carries the Secure flag.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use portcullis_core::LoginState;
use time::{Duration, OffsetDateTime};

use super::identity::SessionToken;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "token";

/// Login state cookie name (for CSRF protection during the OAuth flow).
pub const LOGIN_STATE_COOKIE: &str = "login-state";

/// Path scope of the login state cookie. The callback lands on the login
/// entry point, which lives under it.
const LOGIN_STATE_PATH: &str = "/accounts";

/// Upper bound for one login round trip.
const LOGIN_STATE_TTL: Duration = Duration::minutes(10);

/// Cookie carrying a freshly issued login state.
#[must_use]
pub fn login_state(state: &LoginState) -> Cookie<'static> {
    Cookie::build((LOGIN_STATE_COOKIE, state.to_string()))
        .path(LOGIN_STATE_PATH)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(LOGIN_STATE_TTL)
        .build()
}

/// Cookie that clears the login state.
#[must_use]
pub fn clear_login_state() -> Cookie<'static> {
    let mut cookie = expired(LOGIN_STATE_COOKIE, LOGIN_STATE_PATH);
    cookie.set_http_only(true);
    cookie
}

/// Cookie carrying the session token.
#[must_use]
pub fn session(token: &SessionToken) -> Cookie<'static> {
    let cookie = Cookie::build((SESSION_COOKIE, token.access_token().to_string()))
        .path("/")
        .secure(true)
        .same_site(SameSite::Lax);

    match token.expires_at() {
        Some(expires_at) => cookie.expires(expires_at).build(),
        None => cookie.build(),
    }
}

/// Cookie that clears the session token.
#[must_use]
pub fn clear_session() -> Cookie<'static> {
    expired(SESSION_COOKIE, "/")
}

/// Returns the bearer token, or an empty string for anonymous callers.
#[must_use]
pub fn bearer_token(jar: &CookieJar) -> String {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .unwrap_or_default()
}

/// Returns the login state issued to this browser, if any.
#[must_use]
pub fn issued_login_state(jar: &CookieJar) -> Option<String> {
    jar.get(LOGIN_STATE_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

fn expired(name: &'static str, path: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path(path)
        .secure(true)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .max_age(Duration::ZERO)
        .build()
}
