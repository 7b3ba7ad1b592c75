//! Application state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;

/// Forwarding counters reported by the health endpoint
#[derive(Debug, Default)]
pub struct ProxyStats {
    forwarded: AtomicU64,
    failed: AtomicU64,
}

impl ProxyStats {
    pub fn record_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn forwarded(&self) -> u64 {
        self.forwarded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Shared application state
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Parsed backend origin
    pub target: reqwest::Url,
    /// Pooled upstream client; connections are kept alive between requests
    pub http: reqwest::Client,
    /// Forwarding counters
    pub stats: ProxyStats,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let target = config.target_url()?;

        // Redirects and compression are passed through to the browser untouched
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Arc::new(Self {
            config: Arc::new(config),
            target,
            http,
            stats: ProxyStats::default(),
            start_time: Instant::now(),
        }))
    }

    /// Upstream URL for an incoming path and query.
    ///
    /// A path on the target is kept in front of the request path.
    pub fn upstream_url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.target.as_str().trim_end_matches('/'), path_and_query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_for(target: &str) -> Arc<AppState> {
        AppState::new(Config {
            target: target.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_upstream_url_keeps_request_path() {
        let state = state_for("http://localhost:8000");
        assert_eq!(
            state.upstream_url("/api/conversations/?skip=0&limit=20"),
            "http://localhost:8000/api/conversations/?skip=0&limit=20"
        );
    }

    #[test]
    fn test_upstream_url_with_target_path() {
        let state = state_for("http://backend:8000/v1/");
        assert_eq!(state.upstream_url("/api/auth/me"), "http://backend:8000/v1/api/auth/me");
    }

    #[test]
    fn test_stats_start_at_zero() {
        let state = state_for("http://localhost:8000");
        assert_eq!(state.stats.forwarded(), 0);
        state.stats.record_failed();
        assert_eq!(state.stats.failed(), 1);
    }
}
