//! Background forecast sync.
//!
//! One sync runs at a time. Work is spawned on a tokio runtime and the
//! result is sent back over an mpsc channel, to be drained by the thread
//! that owns the day pager.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use tides_core::SyncState;
use tides_store::WeatherStore;

use crate::client::ForecastClient;
use crate::error::{SyncError, SyncResult};
use crate::payload::SyncSummary;

/// Messages sent from the sync task back to its owner
#[derive(Debug)]
pub enum SyncMessage {
    Finished {
        location_id: i64,
        result: SyncResult<SyncSummary>,
    },
}

/// Outcome of [`Syncer::request_sync`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncRequest {
    /// A sync was spawned; a `Finished` message will follow.
    Started,
    /// Another sync is in flight. Nothing was queued.
    AlreadyRunning,
}

/// Fetches forecasts into a weather store, one location at a time.
pub struct Syncer {
    client: Arc<ForecastClient>,
    weather: Arc<dyn WeatherStore>,
    runtime: Handle,
    state: Arc<Mutex<SyncState>>,
    cancel_token: Mutex<Option<CancellationToken>>,
}

impl Syncer {
    pub fn new(client: ForecastClient, weather: Arc<dyn WeatherStore>, runtime: Handle) -> Self {
        Self {
            client: Arc::new(client),
            weather,
            runtime,
            state: Arc::new(Mutex::new(SyncState::Idle)),
            cancel_token: Mutex::new(None),
        }
    }

    pub fn state(&self) -> SyncState {
        *self.state.lock()
    }

    pub fn is_syncing(&self) -> bool {
        self.state().is_syncing()
    }

    /// Start syncing `location_id` unless a sync is already running.
    ///
    /// Sends `SyncMessage::Finished` on `tx` when the sync completes, fails
    /// or is cancelled. The sync state is back to idle before the message
    /// is sent.
    pub fn request_sync(&self, location_id: i64, tx: &Sender<SyncMessage>) -> SyncRequest {
        {
            let mut state = self.state.lock();
            if !state.can_start_sync() {
                tracing::debug!("Sync for location {} ignored: {:?}", location_id, *state);
                return SyncRequest::AlreadyRunning;
            }
            *state = state.on_sync_started(location_id);
        }

        let token = CancellationToken::new();
        *self.cancel_token.lock() = Some(token.clone());

        let tx = tx.clone();
        let client = self.client.clone();
        let weather = self.weather.clone();
        let state = self.state.clone();

        tracing::info!("Syncing forecast for location {}", location_id);
        self.runtime.spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => Err(SyncError::Cancelled),
                result = sync_location(&client, weather, location_id) => result,
            };

            match &result {
                Ok(summary) => tracing::info!(
                    "Sync for location {} done: {} weather days, {} surf days",
                    location_id,
                    summary.weather_days,
                    summary.surf_days
                ),
                Err(SyncError::Cancelled) => {
                    tracing::info!("Sync for location {} cancelled", location_id)
                }
                Err(e) => tracing::warn!("Sync for location {} failed: {}", location_id, e),
            }

            {
                let mut state = state.lock();
                *state = state.on_sync_done();
            }
            let _ = tx.send(SyncMessage::Finished {
                location_id,
                result,
            });
        });

        SyncRequest::Started
    }

    /// Cancel the in-flight sync, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.cancel_token.lock().take() {
            if !token.is_cancelled() && self.is_syncing() {
                tracing::info!("Cancelling forecast sync");
            }
            token.cancel();
        }
    }
}

async fn sync_location(
    client: &ForecastClient,
    weather: Arc<dyn WeatherStore>,
    location_id: i64,
) -> SyncResult<SyncSummary> {
    let payload = client.fetch(location_id).await?;

    // SQLite writes block, keep them off the async workers
    tokio::task::spawn_blocking(move || payload.apply(location_id, weather.as_ref()))
        .await
        .map_err(|e| SyncError::Task(e.to_string()))?
}
