//! News listing and article content endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use econews_core::{Category, PortalError};
use serde::Deserialize;
use tracing::error;

use crate::AppState;

/// Query parameters for listing news
#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    /// Page number, 1-based
    pub page: Option<usize>,
    /// Articles per page
    pub limit: Option<usize>,
}

/// Create news routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/news/{category}", get(get_category_news))
        .route("/article/{id}", get(get_article_content))
}

/// GET /api/news/{category} - Get a page of aggregated news for a category
async fn get_category_news(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(params): Query<NewsQuery>,
) -> impl IntoResponse {
    let category: Category = match category.parse() {
        Ok(c) => c,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": e.to_string()
                })),
            )
                .into_response();
        }
    };

    let page = params.page.unwrap_or(1);
    // A limit of 0 is out of range and falls back to the portal default
    let limit = params.limit.unwrap_or(0);

    let news_page = state.portal.collect(category, page, limit).await;
    (StatusCode::OK, Json(news_page)).into_response()
}

/// GET /api/article/{id} - Get extracted content for an article from the
/// last served batch
async fn get_article_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let article_id: usize = match id.parse() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": format!("invalid article id '{}': expected a non-negative integer", id),
                    "error_code": "INVALID_ARTICLE_ID"
                })),
            )
                .into_response();
        }
    };

    match state.portal.extract_content(article_id).await {
        Ok(content) => (StatusCode::OK, Json(content)).into_response(),
        Err(PortalError::NotFound(msg)) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": msg,
                "error_code": "INVALID_ARTICLE_ID"
            })),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to extract article content: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("Failed to extract article: {}", e),
                    "error_code": "SYSTEM_ERROR"
                })),
            )
                .into_response()
        }
    }
}
