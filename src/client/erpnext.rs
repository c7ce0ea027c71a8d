//! ERPNext client implementation

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info, warn};
use reqwest::Method;
use serde_json::{Value, json};

use super::auth::{AuthManager, AuthMethod, Credential, SESSION_COOKIE, is_logged_in, mask_key};
use super::http::HttpTransport;
use super::rate_limit::SlidingWindowLimiter;
use super::retry::RetryPolicy;
use super::{ApiRequest, ApiResponse, Transport};
use crate::audit::{AuditLogger, AuthEvent};
use crate::cache::ResponseCache;
use crate::config::{ClientOptions, Config, normalize_base_url};
use crate::error::{ApiError, Result};

/// Session login endpoint
pub const LOGIN_PATH: &str = "/api/method/login";

/// Session logout endpoint
pub const LOGOUT_PATH: &str = "/api/method/logout";

/// Read-only endpoint used to verify a token
pub const PROBE_PATH: &str = "/api/resource/User";

/// Authenticated ERPNext REST client.
///
/// Every call runs the same ordered stages:
///
/// 1. auth precondition (local, no I/O)
/// 2. cache lookup (GET only, when enabled)
/// 3. per attempt: rate-limit admission, transport, audit line
/// 4. retry of transient failures with linear backoff
/// 5. cache store (GET only)
///
/// Cache hits skip the rate limiter; each retry is admitted and audited on
/// its own. All state is owned by the client value, so independent clients
/// never share a cache, window or credential.
pub struct ErpNextClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    auth: AuthManager,
    limiter: Option<SlidingWindowLimiter>,
    cache: Option<ResponseCache>,
    retry: RetryPolicy,
    audit: AuditLogger,
}

impl ErpNextClient {
    /// Create a client talking HTTP to `base_url`.
    pub fn new(base_url: &str, options: ClientOptions) -> Result<Self> {
        options.validate()?;
        let base_url = normalize_base_url(base_url);
        let transport = HttpTransport::new(&base_url, options.timeout())?;
        Self::with_transport(base_url, Arc::new(transport), &options)
    }

    /// Create a client from resolved configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.base_url, config.options.clone())
    }

    /// Create a client over any [`Transport`].
    pub fn with_transport(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        options: &ClientOptions,
    ) -> Result<Self> {
        options.validate()?;
        let base_url = normalize_base_url(&base_url.into());

        if is_insecure(&base_url) {
            warn!(
                "Using HTTP with non-localhost host {}. Use HTTPS in production!",
                base_url
            );
        }

        let limiter = options
            .rate_limit_per_minute
            .and_then(NonZeroU32::new)
            .map(SlidingWindowLimiter::per_minute);

        let cache = options
            .enable_cache
            .then(|| ResponseCache::new(options.cache_timeout()));

        let audit = if options.audit_enabled {
            AuditLogger::new(
                options
                    .audit_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(".")),
            )
        } else {
            AuditLogger::disabled()
        };

        Ok(Self {
            base_url,
            transport,
            auth: AuthManager::new(),
            limiter,
            cache,
            retry: RetryPolicy::new(options.retry_attempts, options.retry_delay()),
            audit,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn is_authenticated(&self) -> bool {
        self.auth.method().await.is_some()
    }

    pub async fn auth_method(&self) -> Option<AuthMethod> {
        self.auth.method().await
    }

    /// Username (session) or masked API key (token); `unknown` otherwise.
    pub async fn current_user(&self) -> String {
        self.auth.actor().await
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Log in with username and password, establishing a session cookie.
    ///
    /// Success requires the "Logged In" marker in the response message and a
    /// `sid` cookie. Failures are reported as `false` and audited.
    pub async fn login_with_credentials(&self, username: &str, password: &str) -> bool {
        let request = ApiRequest::new(Method::POST, LOGIN_PATH)
            .with_body(json!({ "usr": username, "pwd": password }));

        match self.execute(request).await {
            Ok(response) if is_logged_in(&response.body) => {
                let Some(sid) = response.cookie(SESSION_COOKIE) else {
                    warn!("Login response did not set a session cookie");
                    self.audit.record_auth_event(
                        AuthEvent::LoginFailed,
                        username,
                        "no session cookie",
                    );
                    return false;
                };

                self.activate(
                    Credential::Session {
                        cookie: sid.to_string(),
                    },
                    username,
                )
                .await;
                info!("Logged in successfully as {} (session-based)", username);
                self.audit
                    .record_auth_event(AuthEvent::LoginSuccess, username, "");
                true
            }
            Ok(_) => {
                warn!("Login failed for {}", username);
                self.audit
                    .record_auth_event(AuthEvent::LoginFailed, username, "");
                false
            }
            Err(err) => {
                warn!("Login error: {}", err);
                self.audit
                    .record_auth_event(AuthEvent::LoginError, username, &err.to_string());
                false
            }
        }
    }

    /// Authenticate with an API key/secret pair.
    ///
    /// The credential is activated, then verified with a read-only probe that
    /// bypasses the cache. If the probe fails the credential is discarded.
    pub async fn authenticate_with_token(&self, api_key: &str, api_secret: &str) -> bool {
        let actor = mask_key(api_key);
        let credential = Credential::Token {
            key: api_key.to_string(),
            secret: api_secret.to_string(),
        };
        self.activate(credential.clone(), actor.clone()).await;

        let probe = credential.apply(
            ApiRequest::new(Method::GET, PROBE_PATH).with_params(&[("limit_page_length", "1")]),
        );

        match self.execute(probe).await {
            Ok(_) => {
                info!("Token authentication successful");
                self.audit
                    .record_auth_event(AuthEvent::TokenAuthSuccess, &actor, "");
                true
            }
            Err(err) => {
                self.auth.clear().await;
                warn!("Token authentication failed: {}", err);
                self.audit
                    .record_auth_event(AuthEvent::TokenAuthFailed, &actor, &err.to_string());
                false
            }
        }
    }

    /// Drop the active identity.
    ///
    /// Session logins also notify the server; that call is best effort and
    /// its failure is ignored. Local state (credential and cache) is always
    /// cleared.
    pub async fn logout(&self) {
        let actor = self.auth.actor().await;
        let previous = self.auth.credential().await;

        if let Some(credential) = previous
            .as_ref()
            .filter(|c| c.method() == AuthMethod::Session)
        {
            let request = credential.apply(ApiRequest::new(Method::POST, LOGOUT_PATH));
            match self.attempt(&request).await {
                Ok(_) => info!("Logged out successfully"),
                Err(err) => debug!("Ignoring logout error: {}", err),
            }
        }

        self.auth.clear().await;
        self.clear_cache();

        if previous.is_some() {
            self.audit.record_auth_event(AuthEvent::Logout, &actor, "");
        }
        info!("Session cleared");
    }

    /// Replace the active identity. Cached responses belong to the previous
    /// identity and are dropped.
    async fn activate(&self, credential: Credential, actor: impl Into<String>) {
        self.clear_cache();
        self.auth.set(credential, actor).await;
    }

    // ------------------------------------------------------------------
    // Resource access
    // ------------------------------------------------------------------

    /// GET `endpoint` with query `params`, served from cache when fresh.
    pub async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Value> {
        let credential = self.auth.require().await?;

        if let Some(cache) = &self.cache
            && let Some(hit) = cache.get(endpoint, params)
        {
            info!("Cache hit: {}", endpoint);
            return Ok(hit);
        }

        let request =
            credential.apply(ApiRequest::new(Method::GET, endpoint).with_params(params));
        let response = self.execute(request).await?;

        if let Some(cache) = &self.cache {
            cache.put(endpoint, params, response.body.clone());
        }

        Ok(response.body)
    }

    pub async fn post(&self, endpoint: &str, data: Value) -> Result<Value> {
        let request = ApiRequest::new(Method::POST, endpoint).with_body(data);
        Ok(self.send_authorized(request).await?.body)
    }

    pub async fn put(&self, endpoint: &str, data: Value) -> Result<Value> {
        let request = ApiRequest::new(Method::PUT, endpoint).with_body(data);
        Ok(self.send_authorized(request).await?.body)
    }

    pub async fn delete(&self, endpoint: &str) -> Result<Value> {
        let request = ApiRequest::new(Method::DELETE, endpoint);
        Ok(self.send_authorized(request).await?.body)
    }

    /// Forget every cached response.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
            debug!("Cache cleared");
        }
    }

    /// Wait until every audit line recorded so far has been written.
    pub async fn flush_audit(&self) {
        self.audit.flush().await;
    }

    // ------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------

    async fn send_authorized(&self, request: ApiRequest) -> Result<ApiResponse> {
        let credential = self.auth.require().await?;
        Ok(self.execute(credential.apply(request)).await?)
    }

    /// Run a request under the retry policy.
    async fn execute(&self, request: ApiRequest) -> std::result::Result<ApiResponse, ApiError> {
        let request = &request;
        self.retry
            .run(&request.endpoint, move |_| self.attempt(request))
            .await
    }

    /// One attempt: rate-limit admission, exchange, audit line.
    async fn attempt(&self, request: &ApiRequest) -> std::result::Result<ApiResponse, ApiError> {
        if let Some(limiter) = &self.limiter {
            limiter.admit().await;
        }

        let result = self.transport.send(request).await;
        let actor = self.auth.actor().await;

        match &result {
            Ok(response) => {
                self.audit
                    .record_request(&request.method, &request.endpoint, response.status, &actor, "");
            }
            Err(err) => {
                log_failure_hint(err);
                self.audit.record_request(
                    &request.method,
                    &request.endpoint,
                    err.audit_status(),
                    &actor,
                    &err.to_string(),
                );
            }
        }

        result
    }
}

fn log_failure_hint(err: &ApiError) {
    if let ApiError::Remote { status, .. } = err {
        match status {
            401 => warn!("Authentication failed. Token may be expired."),
            403 => warn!("Access forbidden. Check permissions."),
            429 => warn!("Rate limit exceeded by server. Please wait."),
            _ => {}
        }
    }
}

/// Plain HTTP to anything other than the local machine.
fn is_insecure(base_url: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(base_url) else {
        return false;
    };
    if url.scheme() != "http" {
        return false;
    }
    match url.host_str() {
        Some(host) => !(host.contains("localhost") || host == "127.0.0.1" || host == "[::1]"),
        None => false,
    }
}
