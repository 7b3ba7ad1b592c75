//! talk - AI Talk command-line client
//!
//! Logs in against the AI Talk backend, manages conversations and prints
//! streamed AI replies as they arrive.

use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;
mod config;
mod error;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("talk=info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Notified API failures were already printed by the client hooks
            if !error::already_reported(&e) {
                eprintln!("{} {:#}", "✗".red(), e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Load configuration
    let config = config::Config::load()?;

    // Execute command
    match cli.command {
        Commands::Auth(cmd) => commands::auth::execute(cmd, &config).await,
        Commands::Conversation(cmd) => commands::conversation::execute(cmd, &config).await,
        Commands::Message(cmd) => commands::message::execute(cmd, &config).await,
        Commands::Config(cmd) => commands::config::execute(cmd, &config).await,
        Commands::Version => {
            println!("talk {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
