use chrono::NaiveDate;
use thiserror::Error;
use tides_core::{AppError, ForecastError};

use crate::state::WindowState;

/// Errors reported by the day window.
///
/// Navigation errors never change the window. Refresh errors are reported
/// per record and do not stop the other records from refreshing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PagerError {
    /// The store has no usable date bounds. Retry after importing or syncing data.
    #[error("No forecast data available: {0}")]
    DataUnavailable(String),

    /// A move or jump targeted a page outside the window.
    #[error("Day {} is outside the loaded window of {len} days", describe_index(.index))]
    OutOfRange { index: Option<isize>, len: usize },

    /// Navigation or refresh was requested before a build completed.
    #[error("Day window is not ready (state: {0})")]
    NotReady(WindowState),

    /// Recomputing one record failed.
    #[error("Refreshing day {index} ({date}) failed: {reason}")]
    RefreshFailed {
        index: usize,
        date: NaiveDate,
        reason: String,
    },

    /// The build was cancelled before it completed.
    #[error("Building the day window was cancelled")]
    Cancelled,

    #[error("Window capacity must be at least one day")]
    InvalidCapacity,
}

fn describe_index(index: &Option<isize>) -> String {
    match index {
        Some(i) => i.to_string(),
        None => "today".to_string(),
    }
}

impl From<PagerError> for AppError {
    fn from(err: PagerError) -> Self {
        let forecast = match err {
            PagerError::DataUnavailable(msg) => ForecastError::DataUnavailable(msg),
            PagerError::OutOfRange { .. } => ForecastError::DayNotFound,
            PagerError::NotReady(_) => ForecastError::NotReady,
            PagerError::RefreshFailed { date, .. } => ForecastError::RefreshFailed(date.to_string()),
            PagerError::Cancelled => ForecastError::Cancelled,
            PagerError::InvalidCapacity => {
                return AppError::Config(tides_core::ConfigError::Invalid(
                    "window capacity must be at least one day".to_string(),
                ))
            }
        };
        AppError::Forecast(forecast)
    }
}

/// Result type for day window operations.
pub type PagerResult<T> = Result<T, PagerError>;
