use std::{env, path::PathBuf};

/// Route the edge guard sends unauthenticated visitors to.
pub const LOGIN_ROUTE: &str = "/login";
/// Route the edge guard sends authenticated visitors to when they hit a login/register surface.
pub const LANDING_ROUTE: &str = "/";
/// Cookie (and client storage key) holding the session credential.
pub const DEFAULT_COOKIE_NAME: &str = "token";

/// AppConfig
///
/// Holds the portal's configuration. Immutable once loaded; the page server
/// keeps it in `AppState`, the client side reads it once when wiring up.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and cookie defaults.
    pub env: Env,
    // Base URL of the authentication backend (`/token`, `/register`, `/users/me`).
    pub api_base_url: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Name of the cookie the edge guard inspects.
    pub cookie_name: String,
    // Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    // Optional file backing the client-held token slot. In-memory when unset.
    pub client_storage_path: Option<PathBuf>,
    pub login_route: String,
    pub landing_route: String,
}

/// Env
///
/// Runtime context. `Production` demands an explicit backend URL and switches
/// logging to JSON.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Safe, non-panicking configuration for tests and local scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: "http://localhost:8000".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_secure: false,
            client_storage_path: None,
            login_route: LOGIN_ROUTE.to_string(),
            landing_route: LANDING_ROUTE.to_string(),
        }
    }
}

/// env_bool
///
/// Lenient boolean parsing for flags such as `COOKIE_SECURE`.
/// Returns `None` for unset or unrecognised values so callers can pick a default.
pub fn env_bool(key: &str) -> Option<bool> {
    env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in `Env::Production` when `API_BASE_URL` is missing.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => {
                env::var("API_BASE_URL").expect("FATAL: API_BASE_URL must be set in production.")
            }
            Env::Local => {
                env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
            }
        };

        // Secure cookies default on in production only; COOKIE_SECURE overrides both ways.
        let cookie_secure = env_bool("COOKIE_SECURE").unwrap_or(env == Env::Production);

        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            cookie_name: env::var("SESSION_COOKIE_NAME")
                .ok()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
            cookie_secure,
            client_storage_path: env::var("CLIENT_STORAGE_PATH").ok().map(PathBuf::from),
            login_route: LOGIN_ROUTE.to_string(),
            landing_route: LANDING_ROUTE.to_string(),
            env,
        }
    }
}
