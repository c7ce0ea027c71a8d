//! Authentication state and credential injection

use std::fmt;

use serde_json::Value;
use tokio::sync::RwLock;

use super::ApiRequest;
use crate::error::ApiError;

/// Marker ERPNext puts in the login response `message` on success
pub const LOGGED_IN_MARKER: &str = "Logged In";

/// Cookie carrying the ERPNext session id
pub const SESSION_COOKIE: &str = "sid";

/// Actor name used while no identity is established
pub const UNKNOWN_ACTOR: &str = "unknown";

/// How the client is currently authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Session,
    Token,
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Session => f.write_str("session"),
            AuthMethod::Token => f.write_str("token"),
        }
    }
}

/// The active identity. Held in memory only.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    Session { cookie: String },
    Token { key: String, secret: String },
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Session { .. } => f
                .debug_struct("Session")
                .field("cookie", &"<redacted>")
                .finish(),
            Credential::Token { key, .. } => f
                .debug_struct("Token")
                .field("key", &mask_key(key))
                .field("secret", &"<redacted>")
                .finish(),
        }
    }
}

impl Credential {
    pub fn method(&self) -> AuthMethod {
        match self {
            Credential::Session { .. } => AuthMethod::Session,
            Credential::Token { .. } => AuthMethod::Token,
        }
    }

    /// Header name and value that carry this credential.
    pub fn header(&self) -> (&'static str, String) {
        match self {
            Credential::Session { cookie } => ("Cookie", format!("{}={}", SESSION_COOKIE, cookie)),
            Credential::Token { key, secret } => {
                ("Authorization", format!("token {}:{}", key, secret))
            }
        }
    }

    /// Attach this credential to a request.
    pub fn apply(&self, request: ApiRequest) -> ApiRequest {
        let (name, value) = self.header();
        request.with_header(name, value)
    }
}

/// First 8 characters of an API key followed by `...`.
pub fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(8).collect();
    format!("{}...", prefix)
}

/// Whether a login response body reports success.
pub fn is_logged_in(body: &Value) -> bool {
    body.get("message")
        .and_then(Value::as_str)
        .is_some_and(|m| m.contains(LOGGED_IN_MARKER))
}

#[derive(Debug, Default)]
struct AuthState {
    credential: Option<Credential>,
    actor: Option<String>,
}

/// Holds at most one active credential for a client.
#[derive(Debug, Default)]
pub struct AuthManager {
    state: RwLock<AuthState>,
}

impl AuthManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `credential` the active identity, replacing any previous one.
    pub async fn set(&self, credential: Credential, actor: impl Into<String>) {
        let mut state = self.state.write().await;
        state.credential = Some(credential);
        state.actor = Some(actor.into());
    }

    /// Drop the active identity, returning it.
    pub async fn clear(&self) -> Option<Credential> {
        let mut state = self.state.write().await;
        state.actor = None;
        state.credential.take()
    }

    pub async fn credential(&self) -> Option<Credential> {
        self.state.read().await.credential.clone()
    }

    /// The active credential, or `Unauthenticated` without touching the network.
    pub async fn require(&self) -> Result<Credential, ApiError> {
        self.credential().await.ok_or(ApiError::Unauthenticated)
    }

    pub async fn method(&self) -> Option<AuthMethod> {
        self.state
            .read()
            .await
            .credential
            .as_ref()
            .map(Credential::method)
    }

    /// Name recorded in audit lines.
    pub async fn actor(&self) -> String {
        self.state
            .read()
            .await
            .actor
            .clone()
            .unwrap_or_else(|| UNKNOWN_ACTOR.to_string())
    }
}
