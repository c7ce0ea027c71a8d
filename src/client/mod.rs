//! ERPNext API client
//!
//! [`ErpNextClient`] drives each call through a fixed pipeline of stages:
//! auth precondition, cache lookup (GET only), rate limiting, transport,
//! retry, audit, cache store. The stages live in their own modules and share
//! nothing but the client value that owns them.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::error::ApiError;

pub mod auth;
pub mod erpnext;
pub mod http;
#[cfg(test)]
pub mod mock;
pub mod rate_limit;
pub mod retry;

pub use auth::{AuthManager, AuthMethod, Credential};
pub use erpnext::ErpNextClient;
pub use http::HttpTransport;
#[cfg(test)]
pub use mock::MockTransport;
pub use rate_limit::SlidingWindowLimiter;
pub use retry::RetryPolicy;

/// One HTTP exchange to issue against the ERPNext base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the base URL, e.g. `/api/resource/User`
    pub endpoint: String,
    /// Query string parameters
    pub params: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
    /// Extra headers (credentials are injected here)
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            params: Vec::new(),
            body: None,
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: &[(&str, &str)]) -> Self {
        self.params = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of a header added to this request, if any.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body (`Null` when the body was empty)
    pub body: Value,
    /// Cookies set by the response, name to value
    pub cookies: HashMap<String, String>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            cookies: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }
}

/// Issues HTTP exchanges.
///
/// Implementations report non-2xx responses as [`ApiError::Remote`] and
/// missing responses as [`ApiError::Network`]; classification for retries
/// happens above this layer.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}
