mod booking_log;
mod bootstrap;
mod health;
pub mod routes;

use std::sync::Arc;

use anyhow::Result;
use tidyquote_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use tidyquote_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    // Bootstrap with the config we already loaded; a missing or invalid
    // rate table aborts here, before any request is served.
    let app = bootstrap::bootstrap_with_config(config)?;

    let state = routes::QuoteState::new(
        app.engine.clone(),
        Arc::clone(&app.copywriter),
        Arc::clone(&app.bookings),
    );
    let router = routes::router(state).merge(health::router(Arc::clone(&app.rates)));

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        bind_address = %address,
        llm_enabled = app.config.llm.enabled,
        "tidyquote-server started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(app.config.server.graceful_shutdown_secs))
        .await?;

    tracing::info!(event_name = "system.server.stopped", "tidyquote-server stopped");
    Ok(())
}

async fn shutdown_signal(graceful_shutdown_secs: u64) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!(
        event_name = "system.server.stopping",
        graceful_shutdown_secs,
        "shutdown signal received, draining connections"
    );
}
