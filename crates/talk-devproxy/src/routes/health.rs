//! Health check endpoint.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub proxy: ProxyInfo,
}

#[derive(Serialize)]
pub struct ProxyInfo {
    pub prefix: String,
    pub target: String,
    pub forwarded: u64,
    pub failed: u64,
}

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        proxy: ProxyInfo {
            prefix: state.config.prefix.clone(),
            target: state.config.target.clone(),
            forwarded: state.stats.forwarded(),
            failed: state.stats.failed(),
        },
    })
}
