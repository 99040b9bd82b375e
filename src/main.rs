use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dealer_crm_core::api;
use dealer_crm_core::auth_client::AuthClient;
use dealer_crm_core::config::Config;
use dealer_crm_core::handlers::{self, AppState};
use dealer_crm_core::resolver::PermissionResolver;
use dealer_crm_core::scoring::LeadScorer;

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - Lead scorer and permission resolver (with its cache).
/// - Auth service client.
/// - HTTP routes and middleware (CORS, Rate Limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dealer_crm_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let thresholds = config.scoring_thresholds()?;
    let scorer = LeadScorer::new(thresholds);
    tracing::info!(
        "Lead scorer initialized (hot >= {}, warm >= {})",
        thresholds.hot(),
        thresholds.warm()
    );

    // Resolved permission sets live until the TTL, token expiry or logout, whichever is first
    let resolver =
        PermissionResolver::with_full_access(Duration::from_secs(config.permission_cache_ttl_secs));
    tracing::info!(
        "Permission resolver initialized (policy: {}, {}s cache)",
        resolver.policy_name(),
        config.permission_cache_ttl_secs
    );

    let auth_client = AuthClient::new(config.auth_base_url.clone(), config.auth_api_key.clone())
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    tracing::info!("✓ Auth client initialized: {}", config.auth_base_url);

    let port = config.port;
    let app_state = Arc::new(AppState {
        scorer,
        resolver,
        auth_client,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let protected_routes = api::api_routes().layer(
        ServiceBuilder::new()
            // Request size limit: 1MB is plenty for answers plus a transcript
            .layer(RequestBodyLimitLayer::new(1024 * 1024))
            // Rate limiting: 10 req/sec per IP, burst of 20
            .layer(GovernorLayer {
                config: governor_conf,
            }),
    );

    // Health check bypasses rate limiting
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
