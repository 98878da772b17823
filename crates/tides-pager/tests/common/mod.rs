//! Shared fakes for day window tests.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use tides_pager::{PagerError, Presenter, WindowState};
use tides_store::{
    DayRecord, DayStore, StoreError, StoreResult, WeatherSnapshot, WeatherStore,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// In-memory day store with fixed bounds and injectable failures.
#[derive(Default)]
pub struct FakeDayStore {
    pub first: Option<NaiveDate>,
    pub last: Option<NaiveDate>,
    pub failing_dates: Mutex<HashSet<NaiveDate>>,
    pub failing_lookups: Mutex<HashSet<NaiveDate>>,
    pub created: Mutex<Vec<(NaiveDate, i64)>>,
    pub reprocessed: Mutex<Vec<NaiveDate>>,
    /// Cancel the token once this many records have been created.
    pub cancel_after: Option<(usize, CancellationToken)>,
}

impl FakeDayStore {
    pub fn with_bounds(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            first: Some(first),
            last: Some(last),
            ..Self::default()
        }
    }

    /// Bounds wide enough never to truncate a window.
    pub fn unbounded() -> Self {
        Self::with_bounds(date(2000, 1, 1), date(2099, 12, 31))
    }

    pub fn fail_on(&self, date: NaiveDate) {
        self.failing_dates.lock().insert(date);
    }

    /// Make `get_or_create` fail for `date`.
    pub fn fail_lookup_on(&self, date: NaiveDate) {
        self.failing_lookups.lock().insert(date);
    }

    pub fn reprocessed(&self) -> Vec<NaiveDate> {
        self.reprocessed.lock().clone()
    }
}

impl DayStore for FakeDayStore {
    fn get_or_create(&self, date: NaiveDate, location_id: i64) -> StoreResult<DayRecord> {
        let mut created = self.created.lock();
        created.push((date, location_id));
        if let Some((after, token)) = &self.cancel_after {
            if created.len() >= *after {
                token.cancel();
            }
        }
        if self.failing_lookups.lock().contains(&date) {
            return Err(StoreError::invalid("date", date.to_string()));
        }
        Ok(DayRecord::new(date, location_id))
    }

    fn first_available_date(&self) -> StoreResult<Option<NaiveDate>> {
        Ok(self.first)
    }

    fn last_available_date(&self) -> StoreResult<Option<NaiveDate>> {
        Ok(self.last)
    }

    fn reprocess(&self, record: &mut DayRecord, weather: &dyn WeatherStore) -> StoreResult<()> {
        self.reprocessed.lock().push(record.date);
        if self.failing_dates.lock().contains(&record.date) {
            return Err(StoreError::invalid("date", record.date.to_string()));
        }
        record.weather = weather.weather_for(record.date, record.location_id)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    State(WindowState),
    Built { len: usize, today_index: usize },
    Current(usize, NaiveDate),
    Refreshed(usize, NaiveDate),
    Error(PagerError),
}

/// Presenter that records every notification.
#[derive(Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<Event>>,
}

impl RecordingPresenter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn states(&self) -> Vec<WindowState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::State(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn refreshed(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Refreshed(i, _) => Some(i),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Presenter for RecordingPresenter {
    fn on_state_changed(&self, state: WindowState) {
        self.events.lock().push(Event::State(state));
    }

    fn on_window_built(&self, records: &[DayRecord], today_index: usize) {
        self.events.lock().push(Event::Built {
            len: records.len(),
            today_index,
        });
    }

    fn on_current_changed(&self, index: usize, record: &DayRecord) {
        self.events.lock().push(Event::Current(index, record.date));
    }

    fn on_record_refreshed(&self, index: usize, record: &DayRecord) {
        self.events.lock().push(Event::Refreshed(index, record.date));
    }

    fn on_error(&self, error: &PagerError) {
        self.events.lock().push(Event::Error(error.clone()));
    }
}

pub fn sunny(date: NaiveDate) -> WeatherSnapshot {
    WeatherSnapshot {
        date,
        max_temp_c: 20.0,
        min_temp_c: 12.0,
        wind_speed_mph: 8.0,
        wind_direction: "NW".into(),
        precipitation_mm: 0.0,
        description: "Sunny".into(),
        icon: "sun".into(),
    }
}
