//! Opening the on-disk stores.

use std::sync::Arc;

use anyhow::{Context, Result};

use tides_core::StorageConfig;
use tides_store::{DayStore, SqliteDayStore, SqliteWeatherStore, WeatherStore};

/// The day and weather stores shared by the controller and the sync task.
#[derive(Clone)]
pub struct Stores {
    pub days: Arc<dyn DayStore>,
    pub weather: Arc<dyn WeatherStore>,
}

impl Stores {
    /// Open (or create) both databases under `storage.data_dir`.
    pub fn open(storage: &StorageConfig) -> Result<Self> {
        std::fs::create_dir_all(&storage.data_dir).with_context(|| {
            format!("Failed to create data directory {}", storage.data_dir.display())
        })?;

        let weather = Arc::new(
            SqliteWeatherStore::new(storage.weather_db_path())
                .context("Failed to open weather database")?,
        );
        let days = SqliteDayStore::new(storage.day_db_path(), weather.clone())
            .context("Failed to open day database")?;

        tracing::info!("Opened stores in {}", storage.data_dir.display());
        Ok(Self {
            days: Arc::new(days),
            weather,
        })
    }

    pub fn new(days: Arc<dyn DayStore>, weather: Arc<dyn WeatherStore>) -> Self {
        Self { days, weather }
    }
}
