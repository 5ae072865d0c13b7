use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Protected Router Module
///
/// Profile-editing pages. Every path registered here must fall under a
/// `PROTECTED_ROUTES` prefix; the guard enforces cookie presence, and the
/// in-page session manager decides whether the content is actually shown.
pub fn protected_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /experience
        // Work-history editor.
        .route("/experience", get(handlers::experience_page))
        // GET /skills
        // Skill list editor.
        .route("/skills", get(handlers::skills_page))
        // GET /cover-letters
        // Saved cover letters.
        .route("/cover-letters", get(handlers::cover_letters_page))
}
