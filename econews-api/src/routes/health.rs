//! Health check and cache introspection endpoints

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use econews_services::PortalCacheStats;
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    uptime_seconds: u64,
    cache_entries: usize,
    cache_hit_rate: f64,
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let stats = state.portal.cache_stats();

    let response = HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: stats.content.uptime_seconds,
        cache_entries: stats.content.entries,
        cache_hit_rate: stats.content.hit_rate,
    };

    (StatusCode::OK, Json(response))
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Cache stats handler (content cache + dedup registry)
async fn cache_stats(State(state): State<AppState>) -> Json<PortalCacheStats> {
    Json(state.portal.cache_stats())
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
        .route("/cache/stats", get(cache_stats))
}
