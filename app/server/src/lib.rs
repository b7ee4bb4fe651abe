//! FILENAME: app/server/src/lib.rs
// PURPOSE: Main library entry point (HTTP service).
// CONTEXT: One recorder connection per process, shared by every request.

pub mod api_types;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod routes;
pub mod stream;

pub use api_types::{ErrorBody, ExportParams, ExportRequest};
pub use config::Config;
pub use error::ExportError;
pub use export::{prepare_export, skewed_range, PreparedExport, RANGE_SKEW_MINUTES};
pub use routes::{create_app, AppState};

use clap::Parser;
use recorder::{RecorderClient, RecorderError};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("failed to initialise logging: {0}")]
    Logging(#[source] std::io::Error),

    #[error("failed to reach Home Assistant: {0}")]
    Recorder(#[from] RecorderError),

    #[error("failed to bind or serve: {0}")]
    Io(#[from] std::io::Error),
}

/// Connects to the recorder and serves HTTP until ctrl-c.
pub async fn serve(config: Config) -> Result<(), StartupError> {
    let client = RecorderClient::connect(&config.hass_url, &config.token).await?;
    let state = AppState::new(Arc::new(client));

    let listener = TcpListener::bind(config.listen).await?;
    log_info!("SYS", "listening on http://{}", config.listen);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_info!("SYS", "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log_warn!("SYS", "ctrl-c handler unavailable: {}", e);
        std::future::pending::<()>().await;
    }
    log_info!("SYS", "shutdown requested");
}

pub fn run() {
    let config = Config::parse();
    if let Err(e) = logging::init(config.log_level, config.log_file.as_deref()) {
        eprintln!("{}", StartupError::Logging(e));
        std::process::exit(1);
    }
    log_info!("SYS", "statistics-exporter {} starting", env!("CARGO_PKG_VERSION"));

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            log_error!("SYS", "failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(serve(config)) {
        log_error!("SYS", "{}", e);
        log::logger().flush();
        std::process::exit(1);
    }
}
