//! Forecast wire format.
//!
//! ```json
//! {
//!   "weather": [{ "date": "2024-06-15", "max_temp_c": 19.0, ... }],
//!   "surf": [{ "date": "2024-06-15", "forecasts": [{ "hour": 6, ... }] }]
//! }
//! ```

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use tides_store::{SurfForecast, WeatherSnapshot, WeatherStore};

use crate::error::SyncResult;

/// Hourly surf forecasts for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub forecasts: Vec<SurfForecast>,
}

/// Everything the forecast server returns for one location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastPayload {
    #[serde(default)]
    pub weather: Vec<WeatherSnapshot>,
    #[serde(default)]
    pub surf: Vec<SurfDay>,
}

impl ForecastPayload {
    pub fn is_empty(&self) -> bool {
        self.weather.is_empty() && self.surf.is_empty()
    }

    pub fn summary(&self) -> SyncSummary {
        SyncSummary {
            weather_days: self.weather.len(),
            surf_days: self.surf.len(),
        }
    }

    /// Persist the payload for `location_id` and record the sync time.
    pub fn apply(&self, location_id: i64, store: &dyn WeatherStore) -> SyncResult<SyncSummary> {
        store.store_weather(location_id, &self.weather)?;
        for day in &self.surf {
            store.store_surf(location_id, day.date, &day.forecasts)?;
        }
        store.set_last_synced(location_id, Utc::now())?;

        let summary = self.summary();
        tracing::debug!(
            "Applied forecast for location {}: {} weather days, {} surf days",
            location_id,
            summary.weather_days,
            summary.surf_days
        );
        Ok(summary)
    }
}

/// What a completed sync stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub weather_days: usize,
    pub surf_days: usize,
}
