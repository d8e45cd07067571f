//! Identity provider configuration.
//!
//! The identity provider is an external OAuth2 authorization server. This
//! module only describes how to reach it; the HTTP client lives in the
//! server crate.

use serde::{Deserialize, Serialize};

/// Configuration for the OAuth2 identity provider.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityProviderConfig {
    /// Authorize endpoint the browser is redirected to
    /// (e.g., "https://tenant.eu.auth0.com/authorize").
    authorize_url: String,
    /// Token endpoint for the authorization-code exchange.
    token_url: String,
    /// Logout endpoint (e.g., "https://tenant.eu.auth0.com/v2/logout").
    logout_url: String,
    /// The OAuth2 client ID registered with the provider.
    client_id: String,
    /// The OAuth2 client secret.
    client_secret: String,
    /// OAuth2 scopes to request as a comma-separated string.
    /// Default: "openid"
    #[serde(default = "default_scopes")]
    scopes: String,
    /// Audience identifier of the API the issued tokens are meant for.
    #[serde(default)]
    audience: String,
    /// Where the provider sends the browser after logout in production.
    #[serde(default = "default_post_logout_redirect_uri")]
    post_logout_redirect_uri: String,
}

fn default_scopes() -> String {
    "openid".to_string()
}

fn default_post_logout_redirect_uri() -> String {
    "/".to_string()
}

impl IdentityProviderConfig {
    /// Creates a configuration builder from the required fields.
    #[must_use]
    pub fn builder(
        authorize_url: impl Into<String>,
        token_url: impl Into<String>,
        logout_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> IdentityProviderConfigBuilder {
        IdentityProviderConfigBuilder {
            config: Self {
                authorize_url: authorize_url.into(),
                token_url: token_url.into(),
                logout_url: logout_url.into(),
                client_id: client_id.into(),
                client_secret: client_secret.into(),
                scopes: default_scopes(),
                audience: String::new(),
                post_logout_redirect_uri: default_post_logout_redirect_uri(),
            },
        }
    }

    /// Returns the authorize endpoint.
    #[must_use]
    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }

    /// Returns the token endpoint.
    #[must_use]
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Returns the logout endpoint.
    #[must_use]
    pub fn logout_url(&self) -> &str {
        &self.logout_url
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth2 client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the OAuth2 scopes to request, parsed from comma-separated string.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Returns the audience identifier.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Returns the production post-logout return URL.
    #[must_use]
    pub fn post_logout_redirect_uri(&self) -> &str {
        &self.post_logout_redirect_uri
    }
}

/// Builder for `IdentityProviderConfig`.
#[derive(Debug)]
pub struct IdentityProviderConfigBuilder {
    config: IdentityProviderConfig,
}

impl IdentityProviderConfigBuilder {
    /// Sets the OAuth2 scopes to request.
    #[must_use]
    pub fn scopes(mut self, scopes: &[&str]) -> Self {
        self.config.scopes = scopes.join(",");
        self
    }

    /// Sets the audience identifier.
    #[must_use]
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.config.audience = audience.into();
        self
    }

    /// Sets the production post-logout return URL.
    #[must_use]
    pub fn post_logout_redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.config.post_logout_redirect_uri = uri.into();
        self
    }

    /// Builds the `IdentityProviderConfig`.
    #[must_use]
    pub fn build(self) -> IdentityProviderConfig {
        self.config
    }
}
