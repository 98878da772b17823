//! The day view controller.
//!
//! Owns the day pager, the stores and the forecast syncer, and turns user
//! and lifecycle events (start, swipe, location change, pause, resume) into
//! pager operations. All pager mutation happens on the thread that owns the
//! controller; sync results arrive over a channel drained by
//! [`DaysController::poll_sync`].

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use tides_core::{AppError, Config, ConfigError, LocationConfig};
use tides_pager::{DaySequenceManager, Presenter, RefreshReport};
use tides_store::DayRecord;
use tides_sync::{ForecastClient, SyncMessage, SyncRequest, SyncResult, SyncSummary, Syncer};

use crate::stores::Stores;

pub type ControllerResult<T> = Result<T, AppError>;

/// A sync that finished and what was refreshed because of it.
#[derive(Debug)]
pub struct SyncCompletion {
    pub location_id: i64,
    pub result: SyncResult<SyncSummary>,
    /// `None` if the window was not ready or showed another location.
    pub refresh: Option<RefreshReport>,
}

pub struct DaysController {
    config: Config,
    config_path: Option<PathBuf>,
    manager: DaySequenceManager,
    stores: Stores,
    syncer: Syncer,
    tx: Sender<SyncMessage>,
    rx: Receiver<SyncMessage>,
    build_cancel: CancellationToken,
    /// Location to sync once the in-flight sync has finished.
    pending_sync: Option<i64>,
    resumed: bool,
}

impl DaysController {
    pub fn new(
        config: Config,
        stores: Stores,
        client: ForecastClient,
        runtime: Handle,
        presenter: Arc<dyn Presenter>,
    ) -> ControllerResult<Self> {
        let location = config
            .selected_location()
            .ok_or_else(|| ConfigError::Invalid("no locations configured".to_string()))?;
        let manager =
            DaySequenceManager::with_capacity(config.pager.days_to_store, location.key, presenter)?;
        let syncer = Syncer::new(client, stores.weather.clone(), runtime);
        let (tx, rx) = mpsc::channel();

        Ok(Self {
            config,
            config_path: None,
            manager,
            stores,
            syncer,
            tx,
            rx,
            build_cancel: CancellationToken::new(),
            pending_sync: None,
            resumed: false,
        })
    }

    /// Persist location changes to `path`.
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    // =========== Lifecycle ===========

    /// Build the window around `today` and start a sync if configured to.
    pub fn startup(&mut self, today: NaiveDate) -> ControllerResult<()> {
        let location = self.manager.location_id();
        tracing::info!("Starting day view at {} for location {}", today, location);

        let cancel = self.fresh_build_token();
        self.manager
            .build_window_cancellable(today, self.stores.days.as_ref(), &cancel)?;

        if self.config.sync.sync_on_startup {
            self.request_sync();
        }
        Ok(())
    }

    /// Stop background work: an in-flight build or sync is cancelled.
    pub fn pause(&mut self) {
        tracing::debug!("Pausing day view");
        self.build_cancel.cancel();
        self.syncer.cancel();
        self.pending_sync = None;
    }

    /// Come back to the foreground.
    ///
    /// The first resume follows `startup` and does nothing. Later ones
    /// refresh the pages around the current one, rebuilding first if a
    /// paused build left the window empty.
    pub fn resume(&mut self) -> ControllerResult<Option<RefreshReport>> {
        if !self.resumed {
            self.resumed = true;
            return Ok(None);
        }

        if !self.manager.state().is_ready() {
            let Some(reference) = self.manager.reference_date() else {
                return Ok(None);
            };
            let cancel = self.fresh_build_token();
            self.manager
                .build_window_cancellable(reference, self.stores.days.as_ref(), &cancel)?;
        }
        Ok(Some(self.refresh()?))
    }

    // =========== Navigation ===========

    pub fn next_day(&mut self) -> ControllerResult<&DayRecord> {
        Ok(self.manager.move_current(1)?)
    }

    pub fn previous_day(&mut self) -> ControllerResult<&DayRecord> {
        Ok(self.manager.move_current(-1)?)
    }

    pub fn to_today(&mut self) -> ControllerResult<&DayRecord> {
        Ok(self.manager.jump_to_today()?)
    }

    // =========== Sync ===========

    /// Sync forecasts for the location being shown.
    pub fn request_sync(&mut self) -> SyncRequest {
        let location = self.manager.location_id();
        let request = self.syncer.request_sync(location, &self.tx);
        if request == SyncRequest::AlreadyRunning {
            tracing::debug!("Sync already running, not starting another");
        }
        request
    }

    pub fn is_syncing(&self) -> bool {
        self.syncer.is_syncing()
    }

    /// Handle every finished sync without blocking.
    ///
    /// Each completion refreshes the pages around the current one, even when
    /// the sync failed, so the view reflects whatever the store now holds.
    pub fn poll_sync(&mut self) -> Vec<SyncCompletion> {
        let mut completions = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            completions.push(self.on_sync_message(message));
        }
        completions
    }

    /// Block until a sync finishes or `timeout` passes.
    pub fn wait_for_sync(&mut self, timeout: Duration) -> Option<SyncCompletion> {
        match self.rx.recv_timeout(timeout) {
            Ok(message) => Some(self.on_sync_message(message)),
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!("No sync result after {:?}", timeout);
                None
            }
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    fn on_sync_message(&mut self, message: SyncMessage) -> SyncCompletion {
        let SyncMessage::Finished {
            location_id,
            result,
        } = message;

        if let Err(e) = &result {
            tracing::warn!("{}", e.user_message());
        }

        let refresh = if location_id == self.manager.location_id() && self.manager.state().is_ready()
        {
            self.refresh().ok()
        } else {
            None
        };

        if let Some(pending) = self.pending_sync.take() {
            self.syncer.request_sync(pending, &self.tx);
        }

        SyncCompletion {
            location_id,
            result,
            refresh,
        }
    }

    fn refresh(&mut self) -> ControllerResult<RefreshReport> {
        Ok(self
            .manager
            .refresh_neighborhood(self.stores.days.as_ref(), self.stores.weather.as_ref())?)
    }

    // =========== Location ===========

    /// Switch to the configured location at `index`.
    ///
    /// Rebuilds the window for the same "today", syncs the new location and
    /// finally saves the selection.
    pub fn update_location(&mut self, index: usize) -> ControllerResult<RefreshReport> {
        let location = self
            .config
            .locations
            .get(index)
            .cloned()
            .ok_or(ConfigError::UnknownLocation(index))?;
        tracing::info!("Switching to {}", location.name);

        self.syncer.cancel();
        let report = self.manager.change_location(
            location.key,
            self.stores.days.as_ref(),
            self.stores.weather.as_ref(),
        )?;

        if self.request_sync() == SyncRequest::AlreadyRunning {
            // The cancelled sync has not reported back yet
            self.pending_sync = Some(location.key);
        }

        self.config.location_index = index;
        if let Some(path) = &self.config_path {
            self.config.save_to(path)?;
        }
        Ok(report)
    }

    // =========== Accessors ===========

    pub fn manager(&self) -> &DaySequenceManager {
        &self.manager
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn location(&self) -> Option<&LocationConfig> {
        self.config.selected_location()
    }

    pub fn current(&self) -> Option<&DayRecord> {
        self.manager.current()
    }

    /// Token for the build in progress; cancel it from another thread to
    /// abort the build.
    pub fn build_cancel_token(&self) -> CancellationToken {
        self.build_cancel.clone()
    }

    fn fresh_build_token(&mut self) -> CancellationToken {
        self.build_cancel = CancellationToken::new();
        self.build_cancel.clone()
    }
}
