//! Identity provider client using the oauth2 crate.
//!
//! The provider issues the opaque bearer token stored in the session cookie.
//! Nothing here inspects that token; the policy service decides whether it
//! is valid.

use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl,
};
use portcullis_platform_access::IdentityProviderConfig;
use rootcause::prelude::Report;
use time::OffsetDateTime;
use tracing::{debug, instrument};
use url::Url;

/// Parameters of one authorize redirect.
#[derive(Debug, Clone)]
pub struct AuthorizeRequest {
    /// Callback URL on this application.
    pub redirect_uri: String,
    /// CSRF state echoed back by the provider.
    pub state: String,
    /// Ask the provider to re-authenticate even with a live provider session.
    pub force_login: bool,
}

/// Token obtained from a successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    access_token: String,
    expires_at: Option<OffsetDateTime>,
}

impl SessionToken {
    /// Creates a session token.
    #[must_use]
    pub fn new(access_token: impl Into<String>, expires_at: Option<OffsetDateTime>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// Returns the bearer token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns when the token expires, if the provider said.
    #[must_use]
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        self.expires_at
    }
}

/// OAuth2 authorization server used for login and logout.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Builds the URL that starts the authorization-code flow.
    fn authorization_url(
        &self,
        request: &AuthorizeRequest,
    ) -> Result<String, Report<IdentityProviderError>>;

    /// Exchanges an authorization code for a session token.
    ///
    /// `redirect_uri` must be the one used for the authorize redirect.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<SessionToken, Report<IdentityProviderError>>;

    /// Builds the provider logout URL returning the browser to `return_to`.
    fn logout_url(&self, return_to: &str) -> String;
}

/// Identity provider reached over plain OAuth2 endpoints.
pub struct OAuthIdentityProvider {
    config: IdentityProviderConfig,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    logout_url: Url,
    http_client: reqwest::Client,
}

impl OAuthIdentityProvider {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: IdentityProviderConfig) -> Result<Self, Report<IdentityProviderError>> {
        let auth_url = AuthUrl::new(config.authorize_url().to_string()).map_err(|e| {
            IdentityProviderError::Configuration(format!("invalid authorize URL: {}", e))
        })?;
        let token_url = TokenUrl::new(config.token_url().to_string()).map_err(|e| {
            IdentityProviderError::Configuration(format!("invalid token URL: {}", e))
        })?;
        let logout_url = Url::parse(config.logout_url()).map_err(|e| {
            IdentityProviderError::Configuration(format!("invalid logout URL: {}", e))
        })?;

        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                IdentityProviderError::Configuration(format!(
                    "failed to create HTTP client: {}",
                    e
                ))
            })?;

        Ok(Self {
            config,
            auth_url,
            token_url,
            logout_url,
            http_client,
        })
    }

    fn redirect_url(redirect_uri: &str) -> Result<RedirectUrl, IdentityProviderError> {
        RedirectUrl::new(redirect_uri.to_string())
            .map_err(|e| IdentityProviderError::Configuration(format!("invalid redirect URI: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for OAuthIdentityProvider {
    fn authorization_url(
        &self,
        request: &AuthorizeRequest,
    ) -> Result<String, Report<IdentityProviderError>> {
        let client = BasicClient::new(ClientId::new(self.config.client_id().to_string()))
            .set_client_secret(ClientSecret::new(self.config.client_secret().to_string()))
            .set_auth_uri(self.auth_url.clone())
            .set_redirect_uri(Self::redirect_url(&request.redirect_uri)?);

        let state = CsrfToken::new(request.state.clone());
        let mut auth_request = client.authorize_url(move || state);

        for scope in self.config.scopes() {
            auth_request = auth_request.add_scope(Scope::new(scope.to_string()));
        }

        // Request offline access for refresh token
        auth_request = auth_request
            .add_extra_param("access_type", "offline")
            .add_extra_param("audience", self.config.audience());
        if request.force_login {
            auth_request = auth_request.add_extra_param("prompt", "login");
        }

        let (auth_url, _) = auth_request.url();
        Ok(auth_url.to_string())
    }

    #[instrument(skip(self, code))]
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<SessionToken, Report<IdentityProviderError>> {
        let client = BasicClient::new(ClientId::new(self.config.client_id().to_string()))
            .set_client_secret(ClientSecret::new(self.config.client_secret().to_string()))
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(Self::redirect_url(redirect_uri)?);

        let token_response = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| {
                IdentityProviderError::TokenExchange(format!("token exchange failed: {}", e))
            })?;

        let expires_at = token_response
            .expires_in()
            .map(|ttl| OffsetDateTime::now_utc() + ttl);
        debug!(has_expiry = expires_at.is_some(), "authorization code exchanged");

        Ok(SessionToken::new(
            token_response.access_token().secret().clone(),
            expires_at,
        ))
    }

    fn logout_url(&self, return_to: &str) -> String {
        let mut url = self.logout_url.clone();
        url.query_pairs_mut()
            .append_pair("returnTo", return_to)
            .append_pair("client_id", self.config.client_id());
        url.to_string()
    }
}

/// Identity provider errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityProviderError {
    /// Configuration error (invalid URLs, etc.)
    Configuration(String),
    /// Token exchange failed.
    TokenExchange(String),
}

impl std::fmt::Display for IdentityProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "identity provider configuration error: {}", msg),
            Self::TokenExchange(msg) => write!(f, "identity provider token exchange error: {}", msg),
        }
    }
}

impl std::error::Error for IdentityProviderError {}
