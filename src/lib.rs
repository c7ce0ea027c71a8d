//! Secure ERPNext REST API client
//!
//! Authenticates with either a session (username/password) or an API
//! key/secret token, and runs every call through rate limiting, retry,
//! optional response caching and an append-only audit trail.

pub mod audit;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod prompt;

pub use client::{ApiRequest, ApiResponse, AuthMethod, ErpNextClient, Transport};
pub use config::{ClientOptions, Config};
pub use error::{ApiError, ConfigError, Error, Result};
