//! Sliding window of day records behind the day pager.
//!
//! The window holds at most `capacity` consecutive days starting a quarter
//! of the capacity before the reference date ("today"). Neighbouring days
//! are linked by index so each page can look at yesterday and tomorrow
//! without the records referencing each other.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tokio_util::sync::CancellationToken;

use tides_store::{DayRecord, DayStore, WeatherStore};

use crate::error::{PagerError, PagerResult};
use crate::presenter::Presenter;
use crate::state::WindowState;

/// Days kept in the window unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 40;

/// Index links from one record to its neighbours in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NeighborLinks {
    pub yesterday: Option<usize>,
    pub tomorrow: Option<usize>,
}

/// Outcome of a neighbourhood refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Indices refreshed successfully, in refresh order.
    pub refreshed: Vec<usize>,
    /// One `PagerError::RefreshFailed` per record that could not be refreshed.
    pub failed: Vec<PagerError>,
}

impl RefreshReport {
    /// Number of records the refresh attempted.
    pub fn touched(&self) -> usize {
        self.refreshed.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Owns the window of day records for one location.
pub struct DaySequenceManager {
    capacity: usize,
    location_id: i64,
    reference_date: Option<NaiveDate>,
    records: Vec<DayRecord>,
    links: Vec<NeighborLinks>,
    current_index: usize,
    today_index: Option<usize>,
    state: WindowState,
    presenter: Arc<dyn Presenter>,
}

impl DaySequenceManager {
    /// Create an empty manager with the default capacity.
    pub fn new(location_id: i64, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            location_id,
            reference_date: None,
            records: Vec::new(),
            links: Vec::new(),
            current_index: 0,
            today_index: None,
            state: WindowState::Empty,
            presenter,
        }
    }

    /// Create an empty manager holding at most `capacity` days.
    pub fn with_capacity(
        capacity: usize,
        location_id: i64,
        presenter: Arc<dyn Presenter>,
    ) -> PagerResult<Self> {
        if capacity == 0 {
            return Err(PagerError::InvalidCapacity);
        }
        let mut manager = Self::new(location_id, presenter);
        manager.capacity = capacity;
        Ok(manager)
    }

    // =========== Build ===========

    /// Discard the window and rebuild it around `reference_date`.
    ///
    /// # Errors
    /// `DataUnavailable` if the store has no date bounds, its data ends inside
    /// the window before `reference_date`, or a record lookup fails. The
    /// window is left empty.
    pub fn build_window(
        &mut self,
        reference_date: NaiveDate,
        store: &dyn DayStore,
    ) -> PagerResult<()> {
        self.build_window_cancellable(reference_date, store, &CancellationToken::new())
    }

    /// Like [`build_window`](Self::build_window), checking `cancel` before
    /// each record.
    ///
    /// # Errors
    /// As `build_window`, plus `Cancelled` when the token fires. A cancelled
    /// build leaves the window empty.
    pub fn build_window_cancellable(
        &mut self,
        reference_date: NaiveDate,
        store: &dyn DayStore,
        cancel: &CancellationToken,
    ) -> PagerResult<()> {
        self.discard();
        self.reference_date = Some(reference_date);
        self.set_state(self.state.on_build_started());

        match self.populate(reference_date, store, cancel) {
            Ok((records, today_index)) => {
                self.links = link_neighbors(records.len());
                self.records = records;
                self.today_index = Some(today_index);
                self.current_index = today_index;
                self.set_state(self.state.on_build_succeeded());

                tracing::info!(
                    "Built day window for location {}: {} days from {} (today at {})",
                    self.location_id,
                    self.records.len(),
                    self.records.first().map(|r| r.date).unwrap_or(reference_date),
                    today_index
                );
                self.presenter.on_window_built(&self.records, today_index);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Day window build failed: {}", err);
                self.set_state(self.state.on_build_failed());
                self.fail(err)
            }
        }
    }

    /// Collect the records for a new window without touching the current one.
    fn populate(
        &self,
        reference_date: NaiveDate,
        store: &dyn DayStore,
        cancel: &CancellationToken,
    ) -> PagerResult<(Vec<DayRecord>, usize)> {
        let unavailable = |e: tides_store::StoreError| PagerError::DataUnavailable(e.to_string());

        let first = store.first_available_date().map_err(unavailable)?;
        let last = store.last_available_date().map_err(unavailable)?;
        let (Some(_), Some(last)) = (first, last) else {
            return Err(PagerError::DataUnavailable(
                "no tide data has been imported".to_string(),
            ));
        };
        let anchor_offset = (self.capacity / 4) as u64;
        let start = reference_date
            .checked_sub_days(Days::new(anchor_offset))
            .ok_or_else(|| PagerError::DataUnavailable(format!("no date before {reference_date}")))?;

        // Data ending before the window opens never truncates it. Ending
        // inside the window but before today would cut today off.
        if start <= last && last < reference_date {
            return Err(PagerError::DataUnavailable(format!(
                "tide data ends on {last}, before {reference_date}"
            )));
        }

        let mut records = Vec::with_capacity(self.capacity);
        let mut today_index = None;

        for i in 0..self.capacity {
            if cancel.is_cancelled() {
                return Err(PagerError::Cancelled);
            }

            let Some(date) = start.checked_add_days(Days::new(i as u64)) else {
                break;
            };
            let record = store
                .get_or_create(date, self.location_id)
                .map_err(|e| PagerError::DataUnavailable(format!("{date}: {e}")))?;

            if date == reference_date {
                today_index = Some(i);
            }
            records.push(record);

            if date == last {
                break;
            }
        }

        // `last` is before `start` or not before today, and the offset is below capacity
        let today_index = today_index.ok_or_else(|| {
            PagerError::DataUnavailable(format!("{reference_date} is not in the window"))
        })?;
        Ok((records, today_index))
    }

    /// Drop the loaded window. The reference date is kept for rebuilds.
    fn discard(&mut self) {
        self.records.clear();
        self.links.clear();
        self.current_index = 0;
        self.today_index = None;
    }

    // =========== Navigation ===========

    /// Move the current page by `delta` days.
    ///
    /// # Errors
    /// `NotReady` before a successful build; `OutOfRange` if the target is
    /// outside the window, in which case nothing changes.
    pub fn move_current(&mut self, delta: isize) -> PagerResult<&DayRecord> {
        self.ensure_ready()?;

        let len = self.records.len();
        let proposed = (self.current_index as isize).checked_add(delta);
        let target = proposed
            .and_then(|p| usize::try_from(p).ok())
            .filter(|&i| i < len);

        match target {
            Some(index) => Ok(self.select(index)),
            None => self.fail(PagerError::OutOfRange {
                index: proposed,
                len,
            }),
        }
    }

    /// Make today's page current.
    ///
    /// # Errors
    /// `OutOfRange` if the last build did not produce a window containing
    /// today; `NotReady` while a build is in progress.
    pub fn jump_to_today(&mut self) -> PagerResult<&DayRecord> {
        if self.state == WindowState::Building {
            return self.fail(PagerError::NotReady(self.state));
        }
        let today_index = self.today_index;
        match today_index {
            Some(index) if self.state.is_ready() => Ok(self.select(index)),
            _ => self.fail(PagerError::OutOfRange {
                index: None,
                len: self.records.len(),
            }),
        }
    }

    fn select(&mut self, index: usize) -> &DayRecord {
        self.current_index = index;
        let record = &self.records[index];
        self.presenter.on_current_changed(index, record);
        record
    }

    // =========== Refresh ===========

    /// Recompute the current record and its immediate neighbours.
    ///
    /// At most three records are touched: the current one first, then the
    /// previous and next pages if they exist. A failure on one record is
    /// reported in the returned [`RefreshReport`] and does not stop the rest.
    ///
    /// # Errors
    /// `NotReady` before a successful build.
    pub fn refresh_neighborhood(
        &mut self,
        store: &dyn DayStore,
        weather: &dyn WeatherStore,
    ) -> PagerResult<RefreshReport> {
        self.ensure_ready()?;

        let mut report = RefreshReport::default();
        for index in self.neighborhood() {
            let date = self.records[index].date;
            match store.reprocess(&mut self.records[index], weather) {
                Ok(()) => {
                    self.presenter
                        .on_record_refreshed(index, &self.records[index]);
                    report.refreshed.push(index);
                }
                Err(e) => {
                    let err = PagerError::RefreshFailed {
                        index,
                        date,
                        reason: e.to_string(),
                    };
                    tracing::warn!("{}", err);
                    self.presenter.on_error(&err);
                    report.failed.push(err);
                }
            }
        }

        tracing::debug!(
            "Refreshed {} of {} days around index {}",
            report.refreshed.len(),
            report.touched(),
            self.current_index
        );
        Ok(report)
    }

    /// Current index followed by its existing neighbours.
    fn neighborhood(&self) -> Vec<usize> {
        let links = self.links[self.current_index];
        std::iter::once(self.current_index)
            .chain(links.yesterday)
            .chain(links.tomorrow)
            .collect()
    }

    // =========== Location ===========

    /// Rebuild the window for another location and refresh around today.
    ///
    /// The reference date of the previous build is reused, so "today" does
    /// not move even if the clock has passed midnight since.
    ///
    /// # Errors
    /// `NotReady` if no build was ever attempted; otherwise the errors of
    /// [`build_window`](Self::build_window).
    pub fn change_location(
        &mut self,
        location_id: i64,
        store: &dyn DayStore,
        weather: &dyn WeatherStore,
    ) -> PagerResult<RefreshReport> {
        let Some(reference_date) = self.reference_date else {
            return self.fail(PagerError::NotReady(self.state));
        };

        tracing::info!(
            "Changing location {} -> {}",
            self.location_id,
            location_id
        );
        self.location_id = location_id;
        self.build_window(reference_date, store)?;
        self.refresh_neighborhood(store, weather)
    }

    // =========== Accessors ===========

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn location_id(&self) -> i64 {
        self.location_id
    }

    /// The "today" of the last build.
    pub fn reference_date(&self) -> Option<NaiveDate> {
        self.reference_date
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn today_index(&self) -> Option<usize> {
        self.today_index
    }

    /// The current record, `None` unless the window is ready.
    pub fn current(&self) -> Option<&DayRecord> {
        if self.state.is_ready() {
            self.records.get(self.current_index)
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&DayRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[DayRecord] {
        &self.records
    }

    pub fn links(&self, index: usize) -> Option<NeighborLinks> {
        self.links.get(index).copied()
    }

    /// The day before `index`, if it is in the window.
    pub fn yesterday_of(&self, index: usize) -> Option<&DayRecord> {
        self.links(index)?.yesterday.and_then(|i| self.records.get(i))
    }

    /// The day after `index`, if it is in the window.
    pub fn tomorrow_of(&self, index: usize) -> Option<&DayRecord> {
        self.links(index)?.tomorrow.and_then(|i| self.records.get(i))
    }

    pub fn is_today(&self, index: usize) -> bool {
        self.today_index == Some(index)
    }

    // =========== Internals ===========

    fn ensure_ready(&self) -> PagerResult<()> {
        if self.state.is_ready() {
            Ok(())
        } else {
            self.fail(PagerError::NotReady(self.state))
        }
    }

    fn set_state(&mut self, state: WindowState) {
        if self.state == state {
            return;
        }
        tracing::debug!("Day window {} -> {}", self.state, state);
        self.state = state;
        self.presenter.on_state_changed(state);
    }

    fn fail<T>(&self, err: PagerError) -> PagerResult<T> {
        self.presenter.on_error(&err);
        Err(err)
    }
}

/// Link each index to its predecessor and successor.
fn link_neighbors(len: usize) -> Vec<NeighborLinks> {
    (0..len)
        .map(|i| NeighborLinks {
            yesterday: i.checked_sub(1),
            tomorrow: (i + 1 < len).then_some(i + 1),
        })
        .collect()
}
