use axum::{Router, http::HeaderName, middleware};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Edge side: runs inside the page server, before rendering.
pub mod config;
pub mod guard;
pub mod handlers;
pub mod routes;

// Client side: runs with the rendered page.
pub mod backend;
pub mod client;
pub mod forms;
pub mod navigation;
pub mod session;
pub mod storage;

// Shared.
pub mod error;
pub mod models;

use routes::{neutral, protected, public};

// --- Public Re-exports ---

pub use backend::{AuthBackend, HttpAuthBackend, MockAuthBackend};
pub use client::ClientContext;
pub use config::AppConfig;
pub use error::SessionError;
pub use routes::{RouteClass, RouteTable};
pub use session::{SessionManager, SessionState};
pub use storage::CredentialStore;

/// AppState
///
/// Shared state of the page server. The guard needs nothing beyond the
/// configuration and the classification table: it never talks to the backend.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub routes: Arc<RouteTable>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            routes: Arc::new(RouteTable::default()),
        }
    }
}

/// create_router
///
/// Assembles the page routes, puts the edge guard in front of every one of
/// them, and wraps the result in the request-id and tracing layers.
pub fn create_router(state: AppState) -> Router {
    let x_request_id = HeaderName::from_static("x-request-id");

    // 1. Pages, grouped by tier, all behind the guard.
    // Static assets are mounted too; their prefix is excluded from classification.
    let base_router = Router::new()
        .merge(public::public_routes())
        .merge(protected::protected_routes())
        .merge(neutral::neutral_routes())
        .nest_service("/static", ServeDir::new("static"))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::edge_guard,
        ))
        .with_state(state);

    // 2. Observability and correlation layers (outermost).
    base_router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(trace_span_logger)
                    .on_response(
                        DefaultOnResponse::new()
                            .level(Level::INFO)
                            .latency_unit(tower_http::LatencyUnit::Millis),
                    ),
            )
            .layer(PropagateRequestIdLayer::new(x_request_id)),
    )
}

/// trace_span_logger
///
/// Span for one request, correlated by the `x-request-id` header set above.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
