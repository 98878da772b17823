//! SQLite-based weather and surf storage.

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::error::{StoreError, StoreResult};
use crate::store::{date_key, WeatherStore};
use crate::types::{SurfForecast, WeatherSnapshot};

/// SQLite store for synced weather and surf forecasts.
pub struct SqliteWeatherStore {
    conn: Mutex<Connection>,
}

impl SqliteWeatherStore {
    /// Open (or create) the store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for tests and previews).
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.conn.lock().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS weather (
                location_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                data TEXT NOT NULL,
                PRIMARY KEY (location_id, date)
            );

            CREATE TABLE IF NOT EXISTS surf (
                location_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                hour INTEGER NOT NULL,
                data TEXT NOT NULL,
                PRIMARY KEY (location_id, date, hour)
            );

            CREATE TABLE IF NOT EXISTS sync_state (
                location_id INTEGER PRIMARY KEY,
                last_synced_ms INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Number of days with stored weather for a location.
    pub fn weather_days(&self, location_id: i64) -> StoreResult<usize> {
        let count: i64 = self.conn.lock().query_row(
            "SELECT COUNT(*) FROM weather WHERE location_id = ?1",
            params![location_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl WeatherStore for SqliteWeatherStore {
    fn weather_for(
        &self,
        date: NaiveDate,
        location_id: i64,
    ) -> StoreResult<Option<WeatherSnapshot>> {
        let data: Option<String> = self
            .conn
            .lock()
            .query_row(
                "SELECT data FROM weather WHERE location_id = ?1 AND date = ?2",
                params![location_id, date_key(date)],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn surf_for(&self, date: NaiveDate, location_id: i64) -> StoreResult<Vec<SurfForecast>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT data FROM surf WHERE location_id = ?1 AND date = ?2 ORDER BY hour",
        )?;
        let rows = stmt
            .query_map(params![location_id, date_key(date)], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.iter()
            .map(|json| serde_json::from_str::<SurfForecast>(json).map_err(StoreError::from))
            .collect()
    }

    fn store_weather(&self, location_id: i64, weather: &[WeatherSnapshot]) -> StoreResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        for snapshot in weather {
            let json = serde_json::to_string(snapshot)?;
            tx.execute(
                "INSERT OR REPLACE INTO weather (location_id, date, data) VALUES (?1, ?2, ?3)",
                params![location_id, date_key(snapshot.date), json],
            )?;
        }
        tx.commit()?;
        tracing::debug!(
            "Stored {} weather days for location {}",
            weather.len(),
            location_id
        );
        Ok(())
    }

    fn store_surf(
        &self,
        location_id: i64,
        date: NaiveDate,
        surf: &[SurfForecast],
    ) -> StoreResult<()> {
        let key = date_key(date);
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM surf WHERE location_id = ?1 AND date = ?2",
            params![location_id, key],
        )?;
        for forecast in surf {
            let json = serde_json::to_string(forecast)?;
            tx.execute(
                "INSERT OR REPLACE INTO surf (location_id, date, hour, data) VALUES (?1, ?2, ?3, ?4)",
                params![location_id, key, forecast.hour, json],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn last_synced(&self, location_id: i64) -> StoreResult<Option<DateTime<Utc>>> {
        let ms: Option<i64> = self
            .conn
            .lock()
            .query_row(
                "SELECT last_synced_ms FROM sync_state WHERE location_id = ?1",
                params![location_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(ms.and_then(DateTime::from_timestamp_millis))
    }

    fn set_last_synced(&self, location_id: i64, at: DateTime<Utc>) -> StoreResult<()> {
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO sync_state (location_id, last_synced_ms) VALUES (?1, ?2)",
            params![location_id, at.timestamp_millis()],
        )?;
        Ok(())
    }
}
