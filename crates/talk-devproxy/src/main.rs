//! talk-devproxy - AI Talk development server
//!
//! Forwards `/api` to the backend with keep-alive upstream connections and
//! cookie housekeeping, and optionally serves a front-end build.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod proxy;
mod routes;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("talk_devproxy=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("talk-devproxy v{}", env!("CARGO_PKG_VERSION"));

    let args = config::Args::parse();
    let config = config::Config::load(&args)?;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening on http://{}", listener.local_addr()?);
    info!("Forwarding {} -> {}", config.prefix, config.target);
    if let Some(dir) = &config.static_dir {
        info!("Serving {}", dir.display());
    }

    let state = state::AppState::new(config)?;
    let app = routes::create_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
