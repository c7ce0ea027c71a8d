//! Command execution context
//!
//! Loads configuration, builds the client and establishes an identity so
//! request commands only deal with their own endpoint.

use log::debug;

use erpnext_client::config::{resolve_session_credentials, resolve_token_credentials};
use erpnext_client::prompt::TerminalPrompt;
use erpnext_client::{ApiError, Config, ErpNextClient, Result};

use super::Cli;

/// Environment variable consulted for the session password
pub const ENV_PASSWORD: &str = "ERPNEXT_PASSWORD";

/// Authenticated client shared by the request commands
pub struct CommandContext {
    pub client: ErpNextClient,
}

impl CommandContext {
    /// Build an authenticated context from the global flags.
    ///
    /// Token credentials come from the config file or environment, falling
    /// back to masked prompts. `--session` logs in with username/password.
    pub async fn new(cli: &Cli) -> Result<Self> {
        let mut config = Config::load_at(cli.config.as_deref())?;
        if let Some(url) = &cli.url {
            config.base_url = erpnext_client::config::normalize_base_url(url);
        }
        if cli.cache {
            config.options.enable_cache = true;
        }

        let client = ErpNextClient::from_config(&config)?;
        debug!("Using ERPNext at {}", client.base_url());

        let prompt = TerminalPrompt;
        let authenticated = if cli.session {
            let creds = resolve_session_credentials(
                cli.username.clone(),
                std::env::var(ENV_PASSWORD).ok(),
                &prompt,
            )?;
            client
                .login_with_credentials(&creds.username, &creds.password)
                .await
        } else {
            let creds = resolve_token_credentials(&config, None, None, &prompt)?;
            client
                .authenticate_with_token(&creds.api_key, &creds.api_secret)
                .await
        };

        if !authenticated {
            client.flush_audit().await;
            let method = if cli.session {
                "Session login"
            } else {
                "Token authentication"
            };
            return Err(ApiError::AuthenticationFailed(format!(
                "{} rejected by {}",
                method,
                client.base_url()
            ))
            .into());
        }

        Ok(Self { client })
    }

    /// End the session; local state is dropped even if the server is unreachable.
    pub async fn finish(self) {
        self.client.logout().await;
        self.client.flush_audit().await;
    }
}
