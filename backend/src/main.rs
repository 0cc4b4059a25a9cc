//! Farm Monitoring Platform - Backend Server
//!
//! Reconciles heterogeneous farm analytics payloads into one canonical
//! record, caches the reconciled result across restarts, and serves the
//! dashboard, insights, and map views over HTTP.

use axum::{routing::get, Router};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod routes;
mod services;

pub use config::Config;

use external::ProviderClient;
use services::{AnalyticsCache, AnalyticsService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analytics: AnalyticsService,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fmp_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Farm Monitoring Platform Server");
    tracing::info!("Environment: {}", config.environment);

    // Open the analytics cache, warming from the on-disk blob when present
    let cache = Arc::new(AnalyticsCache::open(
        &config.cache.path,
        config.cache.ttl_seconds.map(Duration::from_secs),
    ));
    tracing::info!("Analytics cache ready ({} entries)", cache.entry_count().await);

    // Analytics provider client
    let provider = ProviderClient::new(&config.provider)?;
    let analytics = AnalyticsService::new(provider, cache, config.provider.max_retries);

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        analytics,
    };

    // Build application
    let app = create_app(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Farm Monitoring Platform API v1.0"
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
