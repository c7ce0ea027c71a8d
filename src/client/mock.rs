//! Mock transport for testing
//!
//! Replays queued results in order, then a fallback result, and records every
//! request together with the (tokio) instant it was sent.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use super::{ApiRequest, ApiResponse, Transport};
use crate::error::ApiError;

/// A request observed by [`MockTransport`]
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request: ApiRequest,
    pub at: Instant,
}

/// In-memory [`Transport`].
///
/// # Example
/// ```ignore
/// let mock = Arc::new(
///     MockTransport::new()
///         .with_ok(json!({"data": []}))
///         .always(Err(ApiError::Network("down".into()))),
/// );
/// ```
#[derive(Default)]
pub struct MockTransport {
    /// Results returned in order, one per call
    queued: Mutex<VecDeque<Result<ApiResponse, ApiError>>>,
    /// Result returned once the queue is empty
    fallback: Mutex<Option<Result<ApiResponse, ApiError>>>,
    /// Captured requests for test assertions
    captured: Mutex<Vec<CapturedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, result: Result<ApiResponse, ApiError>) -> Self {
        self.queued.lock().unwrap().push_back(result);
        self
    }

    pub fn with_ok(self, body: Value) -> Self {
        self.with_response(Ok(ApiResponse::new(200, body)))
    }

    pub fn with_error(self, error: ApiError) -> Self {
        self.with_response(Err(error))
    }

    pub fn always(self, result: Result<ApiResponse, ApiError>) -> Self {
        *self.fallback.lock().unwrap() = Some(result);
        self
    }

    pub fn calls(&self) -> usize {
        self.captured.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.captured.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.captured
            .lock()
            .unwrap()
            .last()
            .map(|c| c.request.clone())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.captured.lock().unwrap().push(CapturedRequest {
            request: request.clone(),
            at: Instant::now(),
        });

        if let Some(result) = self.queued.lock().unwrap().pop_front() {
            return result;
        }

        self.fallback
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(ApiError::Network("no mock response configured".to_string())))
    }
}
