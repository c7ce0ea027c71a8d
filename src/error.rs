//! Error types for the ERPNext client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

impl Error {
    /// The API error carried by this error, if any.
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status of a remote failure, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self.as_api() {
            Some(ApiError::Remote { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

/// API-related errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// No credential is active. Raised locally, before any network I/O.
    #[error(
        "Not authenticated. Use login_with_credentials() or authenticate_with_token() first."
    )]
    Unauthenticated,

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// No response was received.
    #[error("Network error: {0}")]
    Network(String),

    /// A response was received with a non-2xx status.
    #[error("Request failed with status {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Whether the failure is transient: no response, or a 5xx status.
    pub fn is_retriable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Remote { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }

    /// Status code to record for this failure; 0 when no response arrived.
    pub fn audit_status(&self) -> u16 {
        match self {
            ApiError::Remote { status, .. } => *status,
            _ => 0,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to ERPNext".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("{0} not provided. Set it in the environment or enter it when prompted.")]
    MissingCredential(&'static str),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
