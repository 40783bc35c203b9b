//! API route modules.

pub mod cache;
pub mod health;
pub mod portfolio;
pub mod repos;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Create the main router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .merge(repos::router())
        .merge(portfolio::router())
        .merge(cache::router());

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}


#[cfg(test)]
mod tests {
    use super::testing::{request, seeded_app};
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_health() {
        let (app, _) = seeded_app();
        request(app.clone(), Method::GET, "/api/repos/octo").await;

        let (status, body) = request(app, Method::GET, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["uptimeSeconds"].is_u64());
        assert_eq!(body["cache"]["size"], 1);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (app, _) = seeded_app();
        let (status, _) = request(app, Method::GET, "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
