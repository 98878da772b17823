pub mod config;
pub mod error;
pub mod sync_state;

pub use config::{
    Config, LocationConfig, PagerConfig, StorageConfig, SyncConfig, ValidationResult,
};
pub use error::{
    AppError, ConfigError, ForecastError, NetworkError, ReqwestErrorExt, RusqliteErrorExt,
    StorageError,
};
pub use sync_state::SyncState;

use anyhow::Result;

/// Initialize logging for the application
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!("Gower Tides core initialized");
    Ok(())
}
