//! Cache management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use folio_core::CacheStats;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::state::AppState;

/// Create cache router
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cache", delete(clear_cache))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/{owner}", delete(invalidate_owner))
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: usize,
}

/// Drop every cached entry
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<ClearResponse> {
    let cache = state.aggregator.cache();
    let removed = cache.stats().size;
    cache.clear();
    info!(removed = removed, "Cache cleared");
    Json(ClearResponse { removed })
}

/// Drop the cached entries of one owner
pub async fn invalidate_owner(
    State(state): State<Arc<AppState>>,
    Path(owner): Path<String>,
) -> Json<ClearResponse> {
    Json(ClearResponse {
        removed: state.aggregator.invalidate_owner(&owner),
    })
}

pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Json<CacheStats> {
    Json(state.aggregator.cache_stats())
}
