//! Init command implementation

use std::path::PathBuf;

use colored::Colorize;

use erpnext_client::config::{normalize_base_url, resolve_token_credentials};
use erpnext_client::prompt::TerminalPrompt;
use erpnext_client::{ApiError, Config, ErpNextClient, Result};

/// Prompt for token credentials, verify them and save the config file.
///
/// Existing settings in the file are kept; only the URL (when given) and the
/// credentials are replaced.
pub async fn run(config_path: Option<&str>, url: Option<&str>) -> Result<()> {
    let path = match config_path {
        Some(p) => PathBuf::from(p),
        None => Config::default_path()?,
    };
    let mut config = if path.exists() {
        Config::load_from(&path)?
    } else {
        Config::default()
    };
    if let Some(url) = url {
        config.base_url = normalize_base_url(url);
    }

    println!("{}", "ERPNext client setup".bold().green());
    println!("Instance: {}\n", config.base_url.cyan());

    // Stored credentials are being replaced, so always ask
    let creds = resolve_token_credentials(&Config::default(), None, None, &TerminalPrompt)?;

    println!("\n{}", "Authenticating...".cyan());
    let client = ErpNextClient::from_config(&config)?;
    let verified = client
        .authenticate_with_token(&creds.api_key, &creds.api_secret)
        .await;
    client.logout().await;
    client.flush_audit().await;

    if !verified {
        return Err(ApiError::AuthenticationFailed(format!(
            "Token rejected by {}",
            config.base_url
        ))
        .into());
    }
    println!("{}", "✓ Authentication successful!".green());

    config.api_key = Some(creds.api_key);
    config.api_secret = Some(creds.api_secret);
    config.save_to(&path)?;

    println!(
        "\n{} Configuration saved to {}",
        "✓".green(),
        path.display().to_string().cyan()
    );
    Ok(())
}
