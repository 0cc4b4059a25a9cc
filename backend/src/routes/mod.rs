//! Route definitions for the Farm Monitoring Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Analytics views
        .nest("/analytics", analytics_routes())
}

/// Analytics reconciliation routes
fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", post(handlers::get_dashboard))
        .route("/insights", post(handlers::get_insights))
        .route("/points", post(handlers::get_points))
}
