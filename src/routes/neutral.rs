use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Neutral Router Module
///
/// Pages with no gate. The guard lets them through in any cookie state.
pub fn neutral_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Load balancer probe.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // Landing page (cover letter generator); where signed-in visitors are sent.
        .route("/", get(handlers::home_page))
        // GET /upload-cv
        .route("/upload-cv", get(handlers::upload_cv_page))
}
