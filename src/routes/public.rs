use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Pages for anonymous visitors. The edge guard redirects visitors who already
/// carry a session cookie to the landing page before these handlers run.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /login
        .route("/login", get(handlers::login_page))
        // GET /register
        .route("/register", get(handlers::register_page))
}
