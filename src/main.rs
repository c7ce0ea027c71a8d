//! erpnext-client - secure command-line client for the ERPNext REST API

use clap::Parser;
use env_logger::Env;

mod cli;

use cli::{Cli, CommandContext, Commands};
use erpnext_client::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match &cli.command {
        Commands::Init => cli::init::run(cli.config.as_deref(), cli.url.as_deref()).await,
        Commands::Status => cli::status::run(cli.config.as_deref()),
        Commands::Keys => {
            cli::guide::keys();
            Ok(())
        }
        Commands::Recommendations => {
            cli::guide::recommendations();
            Ok(())
        }
        command => {
            let ctx = CommandContext::new(&cli).await?;
            let result = match command {
                Commands::Get { endpoints, params } => {
                    cli::request::get(&ctx, endpoints, params).await
                }
                Commands::Post { endpoint, data } => cli::request::post(&ctx, endpoint, data).await,
                Commands::Put { endpoint, data } => cli::request::put(&ctx, endpoint, data).await,
                Commands::Delete { endpoint } => cli::request::delete(&ctx, endpoint).await,
                Commands::Init
                | Commands::Status
                | Commands::Keys
                | Commands::Recommendations => Ok(()),
            };
            ctx.finish().await;
            result
        }
    }
}
