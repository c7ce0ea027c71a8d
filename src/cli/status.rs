//! Status command implementation

use colored::Colorize;

use erpnext_client::Result;
use erpnext_client::config::{Config, ENV_API_KEY, ENV_API_SECRET, ENV_URL};

fn is_set(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| !v.trim().is_empty())
}

/// Report which credentials are available without printing their values.
pub fn run(config_path: Option<&str>) -> Result<()> {
    println!("{}\n", "ERPNext Client Status".bold());

    match Config::load_at(config_path) {
        Ok(config) => {
            let path = match config_path {
                Some(p) => p.to_string(),
                None => Config::default_path()?.display().to_string(),
            };
            println!("Config file: {}", path.cyan());
            println!("Base URL: {}", config.base_url.cyan());
            println!();

            for name in [ENV_API_KEY, ENV_API_SECRET] {
                if is_set(name) {
                    println!("{} {} set", "✓".green(), name);
                } else {
                    println!("{} {} missing", "✗".red(), name);
                }
            }
            if is_set(ENV_URL) {
                println!("{} {} set", "✓".green(), ENV_URL);
            } else {
                println!("{} {} not set (using {})", "○".dimmed(), ENV_URL, config.base_url);
            }

            println!();
            if config.api_key.is_some() && config.api_secret.is_some() {
                println!("{} Token credentials available", "✓".green());
            } else {
                println!("{} Token credentials incomplete", "✗".red());
                println!(
                    "  → Run {} or export {} and {} (see {})",
                    "erpnext-client init".cyan(),
                    ENV_API_KEY,
                    ENV_API_SECRET,
                    "erpnext-client keys".cyan()
                );
            }
            println!();
        }
        Err(err) => {
            println!("{} Configuration could not be loaded: {}", "✗".red(), err);
            println!();
        }
    }

    Ok(())
}
