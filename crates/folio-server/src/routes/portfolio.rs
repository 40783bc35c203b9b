//! Portfolio routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use folio_core::types::PortfolioMetrics;
use std::sync::Arc;

use crate::state::AppState;

/// Create portfolio router
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolio", get(get_default_portfolio))
        .route("/portfolio/{owner}", get(get_portfolio))
}

pub async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    Path(owner): Path<String>,
) -> Json<PortfolioMetrics> {
    Json(state.aggregator.portfolio_metrics(&owner).await)
}

/// Portfolio of the configured default owner
pub async fn get_default_portfolio(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PortfolioMetrics>, (StatusCode, String)> {
    let owner = state.default_owner().ok_or((
        StatusCode::BAD_REQUEST,
        "No default owner configured".to_string(),
    ))?;
    Ok(Json(state.aggregator.portfolio_metrics(owner).await))
}
