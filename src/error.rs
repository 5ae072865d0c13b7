//! Failure taxonomy shared by the session manager, the auth forms and the
//! credential stores.

/// Message shown when a login call fails without a backend explanation.
pub const LOGIN_FAILED: &str = "Login failed";
/// Message shown when a register call fails without a backend explanation.
pub const REGISTER_FAILED: &str = "Registration failed";
/// Message shown when the backend could not be reached at all.
pub const TRANSIENT_FAILURE: &str = "Something went wrong, please try again";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No cookie or client token is present.
    #[error("no session credential present")]
    MissingCredential,
    /// A credential was presented and the identity endpoint rejected it.
    #[error("credential rejected by identity endpoint (status {status})")]
    InvalidCredential { status: u16 },
    /// The backend could not be reached or answered with something unreadable.
    #[error("backend unreachable: {0}")]
    Transient(String),
    /// The backend refused the request and explained why.
    #[error("{0}")]
    Validation(String),
    /// The client-side token slot could not be read or written.
    #[error("credential storage failure: {0}")]
    Storage(String),
}

impl SessionError {
    /// user_message
    ///
    /// The single top-level string an auth form shows. Backend explanations are
    /// passed through verbatim; everything else collapses to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::Validation(detail) => detail.clone(),
            _ => TRANSIENT_FAILURE.to_string(),
        }
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        SessionError::Transient(err.to_string())
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}
