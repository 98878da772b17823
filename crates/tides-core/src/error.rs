//! Error types shared across the Gower Tides crates.
//!
//! Each crate keeps its own error enum and converts into [`AppError`] where
//! it meets the application. Only `user_message()` text is shown on screen.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Forecast error: {0}")]
    Forecast(#[from] ForecastError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Text safe to show in the day view.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Storage(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Forecast(e) => e.user_message(),
            AppError::Io(_) => "Could not read or write a local file.",
            AppError::Other(_) => "Something went wrong. Please try again.",
        }
    }
}

/// Talking to the forecast server failed.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Forecast server unreachable: {0}")]
    Unreachable(String),

    #[error("Forecast request timed out")]
    TimedOut,

    #[error("Forecast server answered {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Forecast response could not be read: {0}")]
    BadPayload(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::Unreachable(_) => "No connection. Showing saved forecasts.",
            NetworkError::TimedOut => "The forecast server is slow to respond. Try again shortly.",
            NetworkError::Http { status, .. } if *status >= 500 => {
                "The forecast server is having problems. Try again later."
            }
            NetworkError::Http { .. } => "The forecast server rejected the request.",
            NetworkError::BadPayload(_) => "The forecast could not be read.",
        }
    }
}

/// The local SQLite databases failed.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Cannot open database: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Stored data is corrupt: {0}")]
    Corrupt(String),
}

impl StorageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::Open(_) => "Saved tide data could not be opened.",
            StorageError::Query(_) => "Saved tide data could not be read.",
            StorageError::Corrupt(_) => "Saved tide data is damaged. Clearing app data may help.",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Malformed configuration file: {0}")]
    Malformed(String),

    #[error("No location at index {0}")]
    UnknownLocation(usize),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "The settings are invalid.",
            ConfigError::Malformed(_) => "The settings file could not be read.",
            ConfigError::UnknownLocation(_) => "That location is not available.",
        }
    }
}

/// Errors surfaced by the day pager and forecast sync.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("No forecast data available: {0}")]
    DataUnavailable(String),

    #[error("Day not found")]
    DayNotFound,

    #[error("Day pager is not ready")]
    NotReady,

    #[error("Refreshing {0} failed")]
    RefreshFailed(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl ForecastError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ForecastError::DataUnavailable(_) => "No tide data is available yet.",
            ForecastError::DayNotFound => "Could not load day.",
            ForecastError::NotReady => "Still loading days. Please wait.",
            ForecastError::RefreshFailed(_) => "Some days could not be updated.",
            ForecastError::Cancelled => "Update cancelled.",
        }
    }
}

/// Classify a `reqwest` failure.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        match self.status() {
            _ if self.is_timeout() => NetworkError::TimedOut,
            _ if self.is_decode() => NetworkError::BadPayload(self.to_string()),
            Some(status) => NetworkError::Http {
                status: status.as_u16(),
                body: self.to_string(),
            },
            None => NetworkError::Unreachable(self.to_string()),
        }
    }
}

/// Classify a `rusqlite` failure.
pub trait RusqliteErrorExt {
    fn into_storage_error(self) -> StorageError;
}

impl RusqliteErrorExt for rusqlite::Error {
    fn into_storage_error(self) -> StorageError {
        let code = self.sqlite_error_code();
        match code {
            Some(rusqlite::ErrorCode::DatabaseCorrupt | rusqlite::ErrorCode::NotADatabase) => {
                StorageError::Corrupt(self.to_string())
            }
            Some(rusqlite::ErrorCode::CannotOpen) => StorageError::Open(self.to_string()),
            _ => StorageError::Query(self.to_string()),
        }
    }
}
