use thiserror::Error;
use tides_core::{AppError, ConfigError, ForecastError, NetworkError, ReqwestErrorExt};
use tides_store::StoreError;

/// Errors that can occur while syncing forecasts.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Forecast server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid forecast payload: {0}")]
    Decode(String),

    #[error("Invalid forecast URL: {0}")]
    InvalidUrl(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Sync task failed: {0}")]
    Task(String),

    #[error("Sync cancelled")]
    Cancelled,
}

impl SyncError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(e) => e.user_message(),
            Self::Status { status, .. } if *status >= 500 => "Sync error: Please try again later.",
            Self::Status { .. } => "The forecast server rejected the request.",
            Self::Decode(_) => "Received an unexpected response. Please try again.",
            Self::InvalidUrl(_) => "Invalid forecast server address. Check your settings.",
            Self::Store(_) => "Unable to save the forecast.",
            Self::Task(_) => "Sync failed unexpectedly. Please try again.",
            Self::Cancelled => "Update cancelled.",
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SyncError::Decode(err.to_string())
        } else {
            SyncError::Network(err.into_network_error())
        }
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Network(e) => AppError::Network(e),
            SyncError::Status { status, message } => {
                AppError::Network(NetworkError::Http {
                    status,
                    body: message,
                })
            }
            SyncError::Decode(msg) => AppError::Network(NetworkError::BadPayload(msg)),
            SyncError::InvalidUrl(msg) => AppError::Config(ConfigError::Invalid(msg)),
            SyncError::Store(e) => e.into(),
            SyncError::Task(msg) => AppError::Other(anyhow::anyhow!(msg)),
            SyncError::Cancelled => AppError::Forecast(ForecastError::Cancelled),
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
