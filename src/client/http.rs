//! reqwest-backed transport

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, SET_COOKIE};
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::Value;

use super::{ApiRequest, ApiResponse, Transport};
use crate::error::{ApiError, Result};

/// Client identifier sent with every request
pub const USER_AGENT: &str = concat!("ERPNext-Secure-Client-RS/", env!("CARGO_PKG_VERSION"));

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";
pub const REQUEST_TIME_HEADER: &str = "X-Request-Time";

/// 16 hex characters, fresh for every attempt.
pub fn generate_request_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(16);
    id
}

/// HTTP transport with fixed headers, timeout and base URL.
pub struct HttpTransport {
    http: HttpClient,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> std::result::Result<ApiResponse, ApiError> {
        let url = format!("{}{}", self.base_url, request.endpoint);

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header(REQUEST_ID_HEADER, generate_request_id())
            .header(
                REQUEST_TIME_HEADER,
                Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            );

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(ApiError::from)?;

        let status = response.status();
        let cookies = parse_set_cookies(response.headers());
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ApiError::Remote {
                status: status.as_u16(),
                message: remote_message(status, &text),
            });
        }

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| {
                ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
            })?
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            body,
            cookies,
        })
    }
}

/// Collect `name=value` pairs from `Set-Cookie` headers, ignoring attributes.
fn parse_set_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| raw.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// Longest raw (non-JSON) error body kept as a message, in characters
const MAX_RAW_MESSAGE: usize = 500;

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Best human-readable message from an ERPNext error body.
fn remote_message(status: StatusCode, text: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        for key in ["message", "exception", "exc_type"] {
            if let Some(Value::String(s)) = map.get(key)
                && !s.is_empty()
            {
                return s.clone();
            }
        }
        if let Some(Value::String(raw)) = map.get("_server_messages")
            && let Some(message) = first_server_message(raw)
        {
            return message;
        }
    }

    let trimmed = text.trim();
    if !trimmed.is_empty() {
        return truncate(trimmed, MAX_RAW_MESSAGE);
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

/// `_server_messages` is a JSON list of JSON-encoded `{"message": ...}` objects.
fn first_server_message(raw: &str) -> Option<String> {
    let entries: Vec<String> = serde_json::from_str(raw).ok()?;
    let first = entries.first()?;
    match serde_json::from_str::<Value>(first) {
        Ok(value) => value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        Err(_) => Some(first.clone()),
    }
}
