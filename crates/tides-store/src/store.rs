//! Storage capabilities consumed by the day pager and the sync task.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::StoreResult;
use crate::types::{DayRecord, SurfForecast, WeatherSnapshot};

/// Day records keyed by calendar date and location.
///
/// Implementations are shared between the UI thread and background tasks,
/// so they must be `Send + Sync`.
pub trait DayStore: Send + Sync {
    /// Get the record for `(date, location_id)`, computing and persisting it
    /// on first request. Later requests return the cached record.
    fn get_or_create(&self, date: NaiveDate, location_id: i64) -> StoreResult<DayRecord>;

    /// Earliest date with tide data, `None` for an empty store.
    fn first_available_date(&self) -> StoreResult<Option<NaiveDate>>;

    /// Latest date with tide data, `None` for an empty store.
    fn last_available_date(&self) -> StoreResult<Option<NaiveDate>>;

    /// Recompute the payload of `record` in place from current store contents.
    fn reprocess(&self, record: &mut DayRecord, weather: &dyn WeatherStore) -> StoreResult<()>;
}

/// Weather and surf forecasts written by the sync task.
pub trait WeatherStore: Send + Sync {
    fn weather_for(&self, date: NaiveDate, location_id: i64)
        -> StoreResult<Option<WeatherSnapshot>>;

    /// Hourly surf forecasts for a day, ordered by hour.
    fn surf_for(&self, date: NaiveDate, location_id: i64) -> StoreResult<Vec<SurfForecast>>;

    /// Insert or replace daily weather, one entry per snapshot date.
    fn store_weather(&self, location_id: i64, weather: &[WeatherSnapshot]) -> StoreResult<()>;

    /// Replace all surf forecasts for a day.
    fn store_surf(
        &self,
        location_id: i64,
        date: NaiveDate,
        surf: &[SurfForecast],
    ) -> StoreResult<()>;

    fn last_synced(&self, location_id: i64) -> StoreResult<Option<DateTime<Utc>>>;

    fn set_last_synced(&self, location_id: i64, at: DateTime<Utc>) -> StoreResult<()>;
}

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Text key used for date columns.
pub(crate) fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub(crate) fn parse_date_key(value: &str) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_KEY_FORMAT)
        .map_err(|_| crate::error::StoreError::invalid("date", value))
}
