//! Router assembly.

pub mod health;

use axum::{
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::proxy;
use crate::state::AppState;

/// Internal endpoints live outside the forwarded prefix
pub const HEALTH_PATH: &str = "/__devproxy/health";

/// Create the main router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let prefix = state.config.prefix.clone();

    let mut router = Router::new()
        .route(HEALTH_PATH, get(health::health_check))
        .route(&prefix, any(proxy::forward))
        .route(&format!("{}/", prefix), any(proxy::forward))
        .route(&format!("{}/{{*rest}}", prefix), any(proxy::forward));

    // Everything else is the front end, when there is one to serve
    if let Some(dir) = &state.config.static_dir {
        router = router.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
    }

    let router = router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()));
    let router = if state.config.cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}
