//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested fields
//! use `__` as separator, e.g. `IDENTITY_PROVIDER__CLIENT_ID`.
//!
//! See [`IdentityProviderConfig`] for the identity provider settings.

use portcullis_platform_access::{DeploymentMode, IdentityProviderConfig};
use serde::Deserialize;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Deployment mode. Local mode simulates the policy service.
    #[serde(default)]
    pub mode: DeploymentMode,

    /// Identity provider configuration.
    pub identity_provider: IdentityProviderConfig,

    /// Policy service configuration.
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Policy service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyConfig {
    /// gRPC endpoint of the policy service (e.g., "http://security:50051").
    /// Required in production mode, ignored in local mode.
    pub endpoint: Option<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_has_correct_defaults() {
        let json = r#"{
            "identity_provider": {
                "authorize_url": "https://idp.example.com/authorize",
                "token_url": "https://idp.example.com/oauth/token",
                "logout_url": "https://idp.example.com/v2/logout",
                "client_id": "my-client",
                "client_secret": "secret"
            }
        }"#;

        let config: ServerConfig = serde_json::from_str(json).expect("deserialize");

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.mode, DeploymentMode::Production);
        assert_eq!(config.policy.endpoint, None);
        assert_eq!(config.identity_provider.client_id(), "my-client");
    }

    #[test]
    fn server_config_reads_mode_and_policy() {
        let json = r#"{
            "bind_addr": "127.0.0.1:8080",
            "mode": "local",
            "identity_provider": {
                "authorize_url": "https://idp.example.com/authorize",
                "token_url": "https://idp.example.com/oauth/token",
                "logout_url": "https://idp.example.com/v2/logout",
                "client_id": "my-client",
                "client_secret": "secret"
            },
            "policy": { "endpoint": "http://security:50051" }
        }"#;

        let config: ServerConfig = serde_json::from_str(json).expect("deserialize");

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert!(config.mode.is_local());
        assert_eq!(
            config.policy.endpoint.as_deref(),
            Some("http://security:50051")
        );
    }
}
