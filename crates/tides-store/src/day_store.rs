//! SQLite-based day record storage.
//!
//! Tide tables are location independent and imported ahead of time. A day
//! record combines the tides for a date with the synced weather and surf for
//! a location; the combined payload is cached in the `days` table the first
//! time it is requested.

use chrono::{NaiveDate, NaiveTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};
use crate::store::{date_key, parse_date_key, DayStore, WeatherStore};
use crate::types::{DayRecord, Tide, TideKind};

const TIME_FORMAT: &str = "%H:%M";

/// SQLite store for tide tables and cached day records.
pub struct SqliteDayStore {
    conn: Mutex<Connection>,
    weather: Arc<dyn WeatherStore>,
}

impl SqliteDayStore {
    /// Open (or create) the store at the given path.
    ///
    /// `weather` supplies forecasts when a day is computed for the first time.
    pub fn new<P: AsRef<Path>>(path: P, weather: Arc<dyn WeatherStore>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn, weather)
    }

    /// Create an in-memory store (for tests and previews).
    pub fn in_memory(weather: Arc<dyn WeatherStore>) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, weather)
    }

    fn with_connection(conn: Connection, weather: Arc<dyn WeatherStore>) -> StoreResult<Self> {
        let store = Self {
            conn: Mutex::new(conn),
            weather,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.conn.lock().execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tides (
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                height REAL NOT NULL,
                kind TEXT NOT NULL,
                PRIMARY KEY (date, time)
            );

            CREATE TABLE IF NOT EXISTS days (
                date TEXT NOT NULL,
                location_id INTEGER NOT NULL,
                payload TEXT NOT NULL,
                computed_at INTEGER NOT NULL,
                PRIMARY KEY (date, location_id)
            );
            "#,
        )?;
        Ok(())
    }

    /// Replace the tide table for one date.
    ///
    /// Cached day records for that date are dropped so they are recomputed
    /// with the new tides on next access.
    pub fn import_tides(&self, date: NaiveDate, tides: &[Tide]) -> StoreResult<()> {
        let key = date_key(date);
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM tides WHERE date = ?1", params![key])?;
        for tide in tides {
            tx.execute(
                "INSERT OR REPLACE INTO tides (date, time, height, kind) VALUES (?1, ?2, ?3, ?4)",
                params![
                    key,
                    tide.time.format(TIME_FORMAT).to_string(),
                    tide.height_m,
                    tide.kind.as_str()
                ],
            )?;
        }
        tx.execute("DELETE FROM days WHERE date = ?1", params![key])?;
        tx.commit()?;
        Ok(())
    }

    /// Drop every cached day record.
    pub fn clear_cache(&self) -> StoreResult<()> {
        self.conn.lock().execute("DELETE FROM days", [])?;
        Ok(())
    }

    /// Number of cached day records.
    pub fn cached_days(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM days", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn tides_for(conn: &Connection, date: NaiveDate) -> StoreResult<Vec<Tide>> {
        let mut stmt =
            conn.prepare("SELECT time, height, kind FROM tides WHERE date = ?1 ORDER BY time")?;
        let rows = stmt
            .query_map(params![date_key(date)], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(time, height_m, kind)| {
                let time = NaiveTime::parse_from_str(&time, TIME_FORMAT)
                    .map_err(|_| StoreError::invalid("tides.time", time.clone()))?;
                let kind =
                    TideKind::parse(&kind).ok_or_else(|| StoreError::invalid("tides.kind", kind))?;
                Ok(Tide {
                    time,
                    height_m,
                    kind,
                })
            })
            .collect()
    }

    fn compute(
        conn: &Connection,
        date: NaiveDate,
        location_id: i64,
        weather: &dyn WeatherStore,
    ) -> StoreResult<DayRecord> {
        Ok(DayRecord {
            date,
            location_id,
            tides: Self::tides_for(conn, date)?,
            surf: weather.surf_for(date, location_id)?,
            weather: weather.weather_for(date, location_id)?,
        })
    }

    fn persist(conn: &Connection, record: &DayRecord) -> StoreResult<()> {
        let payload = serde_json::to_string(record)?;
        conn.execute(
            "INSERT OR REPLACE INTO days (date, location_id, payload, computed_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                date_key(record.date),
                record.location_id,
                payload,
                Utc::now().timestamp_millis()
            ],
        )?;
        Ok(())
    }

    fn bound_date(&self, sql: &str) -> StoreResult<Option<NaiveDate>> {
        let value: Option<String> = self.conn.lock().query_row(sql, [], |row| row.get(0))?;
        value.as_deref().map(parse_date_key).transpose()
    }
}

impl DayStore for SqliteDayStore {
    fn get_or_create(&self, date: NaiveDate, location_id: i64) -> StoreResult<DayRecord> {
        let conn = self.conn.lock();
        let cached: Option<String> = conn
            .query_row(
                "SELECT payload FROM days WHERE date = ?1 AND location_id = ?2",
                params![date_key(date), location_id],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(payload) = cached {
            return Ok(serde_json::from_str(&payload)?);
        }

        let record = Self::compute(&conn, date, location_id, self.weather.as_ref())?;
        Self::persist(&conn, &record)?;
        tracing::trace!("Computed day {} for location {}", date, location_id);
        Ok(record)
    }

    fn first_available_date(&self) -> StoreResult<Option<NaiveDate>> {
        self.bound_date("SELECT MIN(date) FROM tides")
    }

    fn last_available_date(&self) -> StoreResult<Option<NaiveDate>> {
        self.bound_date("SELECT MAX(date) FROM tides")
    }

    fn reprocess(&self, record: &mut DayRecord, weather: &dyn WeatherStore) -> StoreResult<()> {
        let conn = self.conn.lock();
        let fresh = Self::compute(&conn, record.date, record.location_id, weather)?;
        Self::persist(&conn, &fresh)?;
        *record = fresh;
        Ok(())
    }
}
