//! Credential resolution
//!
//! Each value falls back in order: explicit argument, configuration (which
//! already carries the environment), interactive prompt. Secrets are read
//! with masked input.

use std::fmt;

use super::Config;
use crate::error::{ConfigError, Result};
use crate::prompt::Prompt;

/// API key/secret pair for token authentication
#[derive(Clone, PartialEq, Eq)]
pub struct TokenCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl fmt::Debug for TokenCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCredentials")
            .field("api_key", &crate::client::auth::mask_key(&self.api_key))
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Username/password pair for session login
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: String, label: &'static str) -> Result<String> {
    if value.trim().is_empty() {
        Err(ConfigError::MissingCredential(label).into())
    } else {
        Ok(value)
    }
}

/// Resolve the API key and secret for token authentication.
pub fn resolve_token_credentials(
    config: &Config,
    api_key: Option<String>,
    api_secret: Option<String>,
    prompt: &dyn Prompt,
) -> Result<TokenCredentials> {
    let api_key = match present(api_key).or_else(|| present(config.api_key.clone())) {
        Some(key) => key,
        None => required(prompt.input("API Key")?, "API Key")?,
    };

    let api_secret = match present(api_secret).or_else(|| present(config.api_secret.clone())) {
        Some(secret) => secret,
        None => required(prompt.password("API Secret")?, "API Secret")?,
    };

    Ok(TokenCredentials {
        api_key,
        api_secret,
    })
}

/// Resolve the username and password for session login.
pub fn resolve_session_credentials(
    username: Option<String>,
    password: Option<String>,
    prompt: &dyn Prompt,
) -> Result<SessionCredentials> {
    let username = match present(username) {
        Some(user) => user,
        None => required(prompt.input("Username")?, "Username")?,
    };

    let password = match present(password) {
        Some(pwd) => pwd,
        None => required(prompt.password("Password")?, "Password")?,
    };

    Ok(SessionCredentials { username, password })
}
