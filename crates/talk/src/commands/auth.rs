//! Account commands.
//!
//! The access token lives in the credentials file (mode 0600) next to the
//! config. Every other command picks it up from there.

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Password;
use talk_core::types::{LoginRequest, RegisterRequest};

use crate::cli::{AuthAction, AuthCommand};
use crate::config::Config;

pub async fn execute(cmd: AuthCommand, config: &Config) -> Result<()> {
    match cmd.action {
        AuthAction::Register {
            username,
            email,
            password,
        } => register(username, email, password, config).await,
        AuthAction::Login { username, password } => login(username, password, config).await,
        AuthAction::Logout => logout(config),
        AuthAction::Status => status(config).await,
    }
}

fn resolve_password(password: Option<String>, confirm: bool) -> Result<String> {
    if let Some(p) = password {
        return Ok(p);
    }
    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    prompt.interact().context("Failed to read password")
}

async fn register(
    username: String,
    email: String,
    password: Option<String>,
    config: &Config,
) -> Result<()> {
    let password = resolve_password(password, true)?;
    let client = super::client(config)?;

    println!("{} Registering '{}'...", "→".cyan(), username);
    let user = client
        .auth()
        .register(&RegisterRequest {
            username,
            email,
            password,
        })
        .await?;

    println!("{} Account created (id {})", "✓".green(), user.id);
    println!("  Log in with: {}", format!("talk auth login -u {}", user.username).cyan());
    Ok(())
}

async fn login(username: String, password: Option<String>, config: &Config) -> Result<()> {
    let password = resolve_password(password, false)?;
    let client = super::client(config)?;

    client
        .auth()
        .login(&LoginRequest {
            username,
            password,
        })
        .await?;
    let user = client.auth().current_user().await?;

    println!("{} Logged in as {}", "✓".green(), user.username.bold());
    println!(
        "  Token saved to {}",
        config.paths.credentials_file.display().to_string().cyan()
    );
    Ok(())
}

fn logout(config: &Config) -> Result<()> {
    let client = super::client(config)?;

    if !client.auth().is_logged_in() {
        println!("{} Not logged in.", "✗".red());
        return Ok(());
    }

    client.auth().logout()?;
    println!("{} Logged out successfully!", "✓".green());
    Ok(())
}

async fn status(config: &Config) -> Result<()> {
    let client = super::client(config)?;

    println!("{}", "Authentication Status".bold());
    println!("{}", "─".repeat(40));
    println!("Server:    {}", config.api.url.cyan());

    if !client.auth().is_logged_in() {
        println!("Token:     {}", "Not logged in".red());
        return Ok(());
    }
    println!("Token:     {}", "Present".green());

    match client.auth().current_user().await {
        Ok(user) => {
            println!("User:      {} (id {})", user.username.bold(), user.id);
            if let Some(email) = user.email {
                println!("Email:     {}", email);
            }
        }
        Err(e) if e.is_unauthorized() => {
            // The client already cleared the stale token and printed the hint
            println!("Token:     {}", "Rejected by server".red());
        }
        Err(e) => {
            if let Some(cached) = client.auth().cached_user() {
                println!("User:      {} {}", cached.username, "(cached)".dimmed());
            }
            return Err(e.into());
        }
    }

    Ok(())
}
