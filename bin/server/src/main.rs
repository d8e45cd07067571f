use portcullis_authz::{PolicyClient, PolicyService};
use portcullis_platform_access::PermissionEvaluator;
use portcullis_server::{
    auth::{AppState, OAuthIdentityProvider},
    config::ServerConfig,
    router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    tracing::info!(mode = %config.mode, "Loaded configuration");

    // Only production consults the policy service
    let policy: Option<Arc<dyn PolicyService>> = match (&config.policy.endpoint, config.mode) {
        (Some(endpoint), mode) if !mode.is_local() => {
            tracing::info!(%endpoint, "Connecting to policy service...");
            let client = PolicyClient::connect(endpoint.clone())
                .await
                .expect("failed to connect to policy service");
            Some(Arc::new(client) as Arc<dyn PolicyService>)
        }
        _ => None,
    };

    let evaluator = PermissionEvaluator::for_mode(config.mode, policy)
        .expect("invalid authorization configuration");
    if evaluator.is_simulated() {
        tracing::warn!("Policy service is simulated; use $$deny to refuse permissions");
    }

    let post_logout_redirect_uri = config
        .identity_provider
        .post_logout_redirect_uri()
        .to_string();
    let identity_provider = OAuthIdentityProvider::new(config.identity_provider)
        .expect("invalid identity provider configuration");

    let app_state = Arc::new(AppState::new(
        config.mode,
        evaluator,
        Arc::new(identity_provider),
        post_logout_redirect_uri,
    ));

    let app = router(app_state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}
