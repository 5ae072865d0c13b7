use async_trait::async_trait;
use reqwest::StatusCode;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::{
    error::{LOGIN_FAILED, REGISTER_FAILED, SessionError},
    models::{ErrorDetail, IdentityEnvelope, LoginRequest, RegisterRequest, TokenResponse, UserProfile},
};

// 1. AuthBackend Contract
/// AuthBackend
///
/// The three endpoints of the authentication backend the portal consumes.
/// Token issuance and password checks happen behind this trait; the portal
/// only ever sees opaque bearer strings.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// `POST /token`. Returns the issued credential.
    async fn login(&self, request: &LoginRequest) -> Result<String, SessionError>;

    /// `POST /register`. Success carries no credential.
    async fn register(&self, request: &RegisterRequest) -> Result<(), SessionError>;

    /// `GET /users/me`. The only place a stale or forged token is detected:
    /// any non-2xx answer is `InvalidCredential`, a missing answer is `Transient`.
    async fn current_user(&self, token: &str) -> Result<UserProfile, SessionError>;
}

/// BackendState
///
/// Shared handle to whichever backend implementation is wired in.
pub type BackendState = Arc<dyn AuthBackend>;

// 2. The Real Implementation (HTTP)
/// HttpAuthBackend
///
/// Talks to the backend over HTTP with `reqwest`. Timeouts are whatever the
/// transport defaults to; nothing here retries.
#[derive(Clone)]
pub struct HttpAuthBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthBackend {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// rejection_message
///
/// Pulls the detail message out of a failed response, falling back to
/// `fallback` when the body is empty, not JSON, or has no detail.
async fn rejection_message(response: reqwest::Response, fallback: &str) -> String {
    response
        .json::<ErrorDetail>()
        .await
        .ok()
        .and_then(|body| body.message())
        .unwrap_or_else(|| fallback.to_string())
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn login(&self, request: &LoginRequest) -> Result<String, SessionError> {
        let response = self
            .client
            .post(self.url("/token"))
            .form(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let message = rejection_message(response, LOGIN_FAILED).await;
            return Err(SessionError::Validation(message));
        }

        let body = response
            .json::<TokenResponse>()
            .await
            .map_err(|_| SessionError::Validation(LOGIN_FAILED.to_string()))?;

        Ok(body.access_token)
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), SessionError> {
        let response = self
            .client
            .post(self.url("/register"))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let message = rejection_message(response, REGISTER_FAILED).await;
            return Err(SessionError::Validation(message));
        }

        Ok(())
    }

    async fn current_user(&self, token: &str) -> Result<UserProfile, SessionError> {
        if token.trim().is_empty() {
            return Err(SessionError::MissingCredential);
        }

        let response = self
            .client
            .get(self.url("/users/me"))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::InvalidCredential {
                status: status.as_u16(),
            });
        }

        // A 2xx with an unreadable body says nothing about the token; treat it as transient.
        let envelope = response.json::<IdentityEnvelope>().await?;
        Ok(envelope.data)
    }
}

// 3. The Mock Implementation (For Tests)
/// MockAuthBackend
///
/// In-memory backend with a fixed account list. Lets the session manager and
/// the auth forms be exercised without a network.
#[derive(Clone, Default)]
pub struct MockAuthBackend {
    /// username -> (password, issued token)
    accounts: Arc<Mutex<HashMap<String, (String, String)>>>,
    /// token -> profile
    sessions: Arc<Mutex<HashMap<String, UserProfile>>>,
    /// When true, every call fails as if the backend were unreachable.
    pub offline: bool,
    identity_calls: Arc<Mutex<usize>>,
}

impl MockAuthBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    /// Registers an account whose successful login issues `token`.
    pub fn with_account(self, profile: UserProfile, password: &str, token: &str) -> Self {
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.insert(
                profile.username.clone(),
                (password.to_string(), token.to_string()),
            );
        }
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.insert(token.to_string(), profile);
        }
        self
    }

    /// Number of `current_user` calls made so far.
    pub fn identity_calls(&self) -> usize {
        self.identity_calls.lock().map(|count| *count).unwrap_or(0)
    }

    fn check_online(&self) -> Result<(), SessionError> {
        if self.offline {
            return Err(SessionError::Transient("connection refused".to_string()));
        }
        Ok(())
    }

    fn poisoned() -> SessionError {
        SessionError::Transient("mock backend poisoned".to_string())
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn login(&self, request: &LoginRequest) -> Result<String, SessionError> {
        self.check_online()?;
        let accounts = self.accounts.lock().map_err(|_| Self::poisoned())?;
        match accounts.get(&request.username) {
            Some((password, token)) if *password == request.password => Ok(token.clone()),
            _ => Err(SessionError::Validation(
                "Incorrect username or password".to_string(),
            )),
        }
    }

    async fn register(&self, request: &RegisterRequest) -> Result<(), SessionError> {
        self.check_online()?;
        let mut accounts = self.accounts.lock().map_err(|_| Self::poisoned())?;
        if accounts.contains_key(&request.username) {
            return Err(SessionError::Validation(
                "Username already registered".to_string(),
            ));
        }
        let token = format!("token-{}", request.username);
        let profile = UserProfile {
            id: accounts.len() as i64 + 1,
            email: request.email.clone(),
            username: request.username.clone(),
            active: true,
        };
        accounts.insert(request.username.clone(), (request.password.clone(), token.clone()));
        drop(accounts);

        let mut sessions = self.sessions.lock().map_err(|_| Self::poisoned())?;
        sessions.insert(token, profile);
        Ok(())
    }

    async fn current_user(&self, token: &str) -> Result<UserProfile, SessionError> {
        if let Ok(mut calls) = self.identity_calls.lock() {
            *calls += 1;
        }
        self.check_online()?;
        let sessions = self.sessions.lock().map_err(|_| Self::poisoned())?;
        sessions
            .get(token)
            .cloned()
            .ok_or(SessionError::InvalidCredential {
                status: StatusCode::UNAUTHORIZED.as_u16(),
            })
    }
}
