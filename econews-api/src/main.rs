//! Economy News Portal API Server
//!
//! HTTP API server that aggregates economy news from RSS feeds and serves
//! extracted article content.

mod routes;

use axum::{
    http::{header, Method},
    Router,
};
use econews_services::{NewsPortal, PortalConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub portal: Arc<NewsPortal>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,econews_api=debug")),
        )
        .init();

    info!("Starting Economy News Portal API");

    // GEMINI_API_KEY is optional - structural extraction works without it
    let gemini_api_key = std::env::var("GEMINI_API_KEY").ok();
    if gemini_api_key.is_some() {
        info!("Gemini API key found - assisted extraction enabled for flagged sources");
    } else {
        info!("No Gemini API key found - flagged sources will use placeholder content");
    }

    // Initialize the portal (feed collector, extraction chain, content cache)
    let portal = Arc::new(NewsPortal::new(gemini_api_key, PortalConfig::default()));

    // Start background sweepers for the content and dedup caches
    portal.start();

    // Create app state
    let state = AppState { portal };

    // Configure CORS for frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Build router
    let app = Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors)
        .with_state(state);

    // Start server
    let port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
