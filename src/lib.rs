pub mod admissions;
pub mod api;
pub mod config;
pub mod core_state;
pub mod db;
pub mod inference;
pub mod intake;
pub mod models;
pub mod prediction;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, ConfigError};
use crate::core_state::{CoreError, CoreState};
use crate::inference::{ArtifactStore, InferenceError};

/// Failures that stop the service before or while serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Model artifacts unavailable: {0}")]
    Artifacts(#[from] InferenceError),

    #[error("State initialization failed: {0}")]
    Core(#[from] CoreError),

    #[error(transparent)]
    Server(#[from] api::ServerError),
}

/// Initialize logging, load artifacts and storage, then serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = AppConfig::from_env()?;

    let artifacts = Arc::new(ArtifactStore::load(&config.artifacts_dir)?);

    let core = Arc::new(CoreState::initialize(&config, artifacts)?);

    api::server::serve(core, config.bind_addr, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown requested"),
        Err(e) => {
            tracing::error!("Cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await
        }
    }
}
