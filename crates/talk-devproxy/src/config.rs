//! Server configuration.
//!
//! Settings are resolved with precedence:
//! 1. Command-line arguments (or their `TALK_DEVPROXY_*` environment fallbacks)
//! 2. Config file given with `--config`
//! 3. Default values

use anyhow::{bail, Context};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use talk_core::client::DEFAULT_MAX_LENGTH;

/// Port the front end is served on
pub const DEFAULT_PORT: u16 = 3000;

/// Path prefix forwarded to the backend
pub const DEFAULT_PREFIX: &str = "/api";

/// Backend origin
pub const DEFAULT_TARGET: &str = "http://localhost:8000";

/// AI Talk development server
///
/// Forwards API calls to the backend and optionally serves a front-end build.
#[derive(Parser, Debug, Default)]
#[command(name = "talk-devproxy")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// TOML config file
    #[arg(short, long, env = "TALK_DEVPROXY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "TALK_DEVPROXY_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "TALK_DEVPROXY_PORT")]
    pub port: Option<u16>,

    /// Backend origin requests are forwarded to
    #[arg(short, long, env = "TALK_DEVPROXY_TARGET")]
    pub target: Option<String>,

    /// Path prefix to forward
    #[arg(long)]
    pub prefix: Option<String>,

    /// Directory served for every other path
    #[arg(long, env = "TALK_DEVPROXY_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Requests under this prefix go to `target`, path unchanged
    pub prefix: String,
    /// Backend origin
    pub target: String,
    /// Send the target's authority as `Host` instead of the client's
    pub change_origin: bool,
    /// Answer CORS preflights for any origin
    pub cors: bool,
    /// Front-end build served for non-API paths
    pub static_dir: Option<PathBuf>,
    /// Largest request body forwarded, in bytes
    pub max_body_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            prefix: DEFAULT_PREFIX.to_string(),
            target: DEFAULT_TARGET.to_string(),
            change_origin: true,
            cors: true,
            static_dir: None,
            max_body_length: DEFAULT_MAX_LENGTH,
        }
    }
}

impl Config {
    /// Resolve the configuration for `args`
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load_from(path)?,
            None => Self::default(),
        };
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    fn apply_args(&mut self, args: &Args) {
        if let Some(host) = &args.host {
            self.host = host.clone();
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(target) = &args.target {
            self.target = target.clone();
        }
        if let Some(prefix) = &args.prefix {
            self.prefix = prefix.clone();
        }
        if let Some(dir) = &args.static_dir {
            self.static_dir = Some(dir.clone());
        }
    }

    /// Normalize the prefix and check the target origin
    fn validate(&mut self) -> anyhow::Result<()> {
        let prefix = self.prefix.trim().trim_end_matches('/');
        if prefix.is_empty() {
            bail!("Proxy prefix must not be empty or '/'");
        }
        self.prefix = if prefix.starts_with('/') {
            prefix.to_string()
        } else {
            format!("/{}", prefix)
        };

        let target = self.target_url()?;
        if !matches!(target.scheme(), "http" | "https") {
            bail!("Proxy target must be an http(s) URL: {}", self.target);
        }

        if let Some(dir) = &self.static_dir {
            if !dir.is_dir() {
                bail!("Static directory does not exist: {}", dir.display());
            }
        }
        Ok(())
    }

    /// The backend origin as a URL
    pub fn target_url(&self) -> anyhow::Result<reqwest::Url> {
        reqwest::Url::parse(&self.target)
            .with_context(|| format!("Invalid proxy target: {}", self.target))
    }

    /// `host:port` to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
