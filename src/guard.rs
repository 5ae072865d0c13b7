use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    AppState,
    config::AppConfig,
    routes::{RouteClass, RouteTable},
};

/// GuardDecision
///
/// Outcome of the edge guard for one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The request proceeds unmodified.
    Allow,
    /// The request is answered with a redirect to the given route.
    Redirect(String),
}

/// has_session_cookie
///
/// Presence is the only signal the guard has: the token is never decoded or
/// verified here. Missing, unparsable and empty cookies all count as "no token".
pub fn has_session_cookie(jar: &CookieJar, cookie_name: &str) -> bool {
    jar.get(cookie_name)
        .map(|cookie| !cookie.value().trim().is_empty())
        .unwrap_or(false)
}

/// evaluate
///
/// The guard's redirect policy as a pure function of the path and cookie presence.
///
/// - `Public` with a token redirects to the landing route.
/// - `Protected` without a token redirects to the login route.
/// - Everything else is allowed.
///
/// Redirect targets are classified so that the redirected request is allowed:
/// the landing route is never `Public` and the login route is never `Protected`.
pub fn evaluate(table: &RouteTable, config: &AppConfig, path: &str, has_token: bool) -> GuardDecision {
    match (table.classify(path), has_token) {
        (RouteClass::Public, true) => GuardDecision::Redirect(config.landing_route.clone()),
        (RouteClass::Protected, false) => GuardDecision::Redirect(config.login_route.clone()),
        _ => GuardDecision::Allow,
    }
}

/// edge_guard
///
/// Middleware applied to every page route before any handler runs.
/// It has no access to the backend; it only reads the request path and cookies.
pub async fn edge_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    let has_token = has_session_cookie(&jar, &state.config.cookie_name);
    let path = request.uri().path().to_owned();

    match evaluate(&state.routes, &state.config, &path, has_token) {
        GuardDecision::Allow => next.run(request).await,
        GuardDecision::Redirect(target) => {
            tracing::debug!(path = %path, has_token, target = %target, "edge guard redirect");
            Redirect::temporary(&target).into_response()
        }
    }
}
