use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::sync::SyncService;
use crate::trakt::models::{ListItem, Movie};
use crate::trakt::TraktClient;

/// Application version from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sync: Arc<SyncService>,
    pub trakt: Arc<TraktClient>,
}

/// POST / request body
#[derive(Debug, Default, Deserialize)]
pub struct SyncListRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub media_list: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ItemQuery {
    #[serde(default)]
    pub id: Option<String>,
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            post(sync_list_handler)
                .get(get_item_handler)
                .fallback(invalid_method_handler),
        )
        .route("/health", axum::routing::get(health_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// POST / - Replace a named list with the given IMDb ids
///
/// Body: `{"name": "top-movies", "media_list": ["tt0111161", ...]}`.
/// Returns the repopulated list items as a JSON array.
async fn sync_list_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<ListItem>>, ApiError> {
    // Parse leniently: an unreadable body is treated the same as missing fields
    let request: SyncListRequest = serde_json::from_slice(&body).unwrap_or_default();

    let name = request.name.filter(|name| !name.is_empty());
    let media_list = request.media_list.filter(|list| !list.is_empty());

    let (Some(name), Some(media_list)) = (name, media_list) else {
        tracing::warn!("Missing 'name' or 'media_list' in request data.");
        return Err(ApiError::Validation(
            "Missing 'name' or 'media_list' in request data.".to_string(),
        ));
    };

    tracing::info!(
        "Request to sync list '{}' with {} movies",
        name,
        media_list.len()
    );

    let items = state
        .sync
        .replace_list(&name, &media_list)
        .await
        .map_err(|e| {
            tracing::error!("Failed to post Trakt list: {}", e);
            e
        })?;

    Ok(Json(items))
}

/// GET /?id=... - Fetch a single movie by IMDb id
async fn get_item_handler(
    State(state): State<AppState>,
    Query(query): Query<ItemQuery>,
) -> Result<Json<Movie>, ApiError> {
    let Some(id) = query.id.filter(|id| !id.is_empty()) else {
        tracing::warn!("Missing 'id'.");
        return Err(ApiError::Validation("Missing id.".to_string()));
    };

    let movie = state.trakt.lookup_movie(&id).await.map_err(|e| {
        tracing::error!("Failed to get Trakt item: {}", e);
        e
    })?;

    Ok(Json(movie))
}

/// Any method other than POST or GET on the handler surface
async fn invalid_method_handler() -> ApiError {
    ApiError::Validation("Invalid HTTP method. Use either POST or GET.".to_string())
}

/// GET /health - Health check
///
/// This endpoint does not hit the Trakt API (for load balancers).
async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": VERSION
    }))
}
