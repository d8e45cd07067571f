//! Redirect targets for the login round trip.
//!
//! The page a user was trying to reach travels through the identity provider
//! as the `next` query parameter. Whatever comes back is untrusted: only its
//! path and query are reused, so a crafted `next` cannot send the browser to
//! another origin.

use url::Url;
use url::form_urlencoded::Serializer;

/// Entry point of the login flow.
pub const LOGIN_PATH: &str = "/accounts/login";

/// Entry point of the logout flow.
pub const LOGOUT_PATH: &str = "/accounts/logout";

/// Base used to resolve caller-supplied `next` values. Only the path and
/// query of the result are kept, so the host never leaks into a redirect.
const RESOLUTION_BASE: &str = "https://same-origin.invalid/";

/// Returns the path and query of a request, the value carried as `next`.
#[must_use]
pub fn next_from_request(path: &str, query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => format!("{path}?{query}"),
        _ => path.to_string(),
    }
}

/// Returns the login entry point with `next` attached.
#[must_use]
pub fn login_location(next: &str) -> String {
    format!("{LOGIN_PATH}?{}", encode_next(next))
}

/// Returns the OAuth callback URL for `host`.
///
/// The callback is the login entry point itself, always on the secure scheme,
/// with the raw `next` value carried along so the return trip keeps it.
#[must_use]
pub fn callback_url(host: &str, next: &str) -> String {
    format!("https://{host}{LOGIN_PATH}?{}", encode_next(next))
}

/// Reduces a caller-supplied `next` value to a same-origin path.
///
/// Missing, empty and root values resolve to `/`. Anything else is parsed
/// and only its path plus query survive; unparseable input falls back to `/`.
#[must_use]
pub fn resolve_next(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|raw| !raw.is_empty() && *raw != "/") else {
        return "/".to_string();
    };

    let Ok(url) = Url::parse(RESOLUTION_BASE).and_then(|base| base.join(raw)) else {
        return "/".to_string();
    };

    // A path starting with "//" would be read by browsers as another host.
    let mut next = format!("/{}", url.path().trim_start_matches('/'));
    if let Some(query) = url.query() {
        next.push('?');
        next.push_str(query);
    }
    next
}

fn encode_next(next: &str) -> String {
    Serializer::new(String::new())
        .append_pair("next", next)
        .finish()
}
