//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

pub mod context;
pub mod guide;
pub mod init;
pub mod request;
pub mod status;

pub use context::CommandContext;

/// Secure command-line client for the ERPNext REST API
#[derive(Parser, Debug)]
#[command(name = "erpnext-client")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// ERPNext base URL (overrides config and ERPNEXT_URL)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Override config file location
    #[arg(long, global = true, env = "ERPNEXT_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "ERPNEXT_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Log in with username and password instead of an API token
    #[arg(long, global = true)]
    pub session: bool,

    /// Username for --session (prompted when missing)
    #[arg(long, global = true, env = "ERPNEXT_USERNAME", hide_env = true)]
    pub username: Option<String>,

    /// Cache GET responses for the duration of the command
    #[arg(long, global = true)]
    pub cache: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one or more resources (endpoints are fetched concurrently)
    Get {
        /// Endpoint paths, e.g. /api/resource/Customer
        #[arg(required = true)]
        endpoints: Vec<String>,

        /// Query parameter as name=value (repeatable)
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Create a resource from a JSON document
    Post {
        endpoint: String,
        /// JSON request body
        data: String,
    },

    /// Update a resource from a JSON document
    Put {
        endpoint: String,
        /// JSON request body
        data: String,
    },

    /// Delete a resource
    Delete { endpoint: String },

    /// Verify API token credentials and save them to the config file
    Init,

    /// Show which credentials are available in the environment
    Status,

    /// Print instructions for generating API keys
    Keys,

    /// Print security recommendations
    Recommendations,
}

/// Parse a `name=value` query parameter.
fn parse_param(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got '{}'", raw)),
    }
}
