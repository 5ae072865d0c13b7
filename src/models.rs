use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- Identity (owned by the backend) ---

/// UserProfile
///
/// The backend's view of the signed-in user, as returned by `GET /users/me`.
/// The client holds a read-only copy for the lifetime of one page load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub username: String,
    /// Serialised as `is_active` on the wire.
    #[serde(rename = "is_active")]
    pub active: bool,
}

/// IdentityEnvelope
///
/// `GET /users/me` wraps the profile in a `data` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityEnvelope {
    pub data: UserProfile,
}

// --- Request payloads ---

/// LoginRequest
///
/// Form-encoded body of `POST /token`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// RegisterRequest
///
/// JSON body of `POST /register`.
/// The password is forwarded to the backend and never logged or stored here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

// --- Response payloads ---

/// TokenResponse
///
/// Successful `POST /token` answer carrying the opaque bearer credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// ErrorDetail
///
/// Failure body of every backend endpoint. `detail` is usually a string, but
/// request-validation failures (422) carry a list of `{ loc, msg, type }` entries.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorDetail {
    /// message
    ///
    /// The text the auth forms show. Strings pass through verbatim; validation
    /// lists are reduced to their `msg` entries joined with `; `; any other
    /// non-null value is shown as JSON. `None` when there is nothing to show.
    pub fn message(&self) -> Option<String> {
        let message = match self.detail.as_ref()? {
            Value::Null => return None,
            Value::String(text) => text.clone(),
            Value::Array(entries) => {
                let messages: Vec<String> = entries
                    .iter()
                    .map(|entry| match entry.get("msg").and_then(Value::as_str) {
                        Some(msg) => msg.to_string(),
                        None => entry.as_str().map(str::to_string).unwrap_or_else(|| entry.to_string()),
                    })
                    .collect();
                messages.join("; ")
            }
            other => other.to_string(),
        };
        Some(message).filter(|message| !message.trim().is_empty())
    }
}
