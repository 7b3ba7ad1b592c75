//! Command implementations for talk CLI.
//!
//! Each submodule implements the logic for a command group. All of them talk
//! to the backend through a [`ApiClient`] built by [`client`], which wires the
//! interceptor side effects to the terminal.

pub mod auth;
pub mod config;
pub mod conversation;
pub mod message;

use anyhow::{Context, Result};
use colored::Colorize;
use std::sync::Arc;
use talk_core::auth::FileStore;
use talk_core::client::{Navigator, Notifier};
use talk_core::ApiClient;
use tracing::debug;

use crate::config::Config;
use crate::error::TalkError;

/// After a 401 the stored session is gone; point the user at `auth login`
struct LoginHint;

impl Navigator for LoginHint {
    fn redirect(&self, location: &str) {
        debug!("Redirect to {} requested", location);
        eprintln!(
            "{} Session expired or invalid. Run {} to log in again.",
            "✗".red(),
            "talk auth login".cyan()
        );
    }
}

/// Print API failures to stderr
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }
}

/// Build the API client for the current configuration
pub fn client(config: &Config) -> Result<ApiClient> {
    let store = FileStore::open(&config.paths.credentials_file).with_context(|| {
        format!(
            "Failed to open credentials at {}",
            config.paths.credentials_file.display()
        )
    })?;

    let client = ApiClient::new(
        config.client_config(),
        Arc::new(store),
        Arc::new(LoginHint),
        Arc::new(StderrNotifier),
    )?;
    Ok(client)
}

/// Build the API client, failing early when no token is stored
pub fn logged_in_client(config: &Config) -> Result<ApiClient> {
    let client = client(config)?;
    if !client.auth().is_logged_in() {
        return Err(TalkError::NotLoggedIn.into());
    }
    Ok(client)
}

/// Format an optional backend timestamp for tables
pub(crate) fn format_time(ts: Option<chrono::NaiveDateTime>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Shorten `text` to at most `max` characters for single-line display
pub(crate) fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max {
        single_line
    } else {
        let mut out: String = single_line.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}
