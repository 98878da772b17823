//! Forecast sync state machine.
//!
//! Ensures only one network sync runs at a time. Used by the sync task.

/// Operation state for serializing forecast syncs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    /// A sync for the given location key is in flight.
    Syncing { location_id: i64 },
}

impl SyncState {
    /// True if a new sync can be started.
    pub fn can_start_sync(self) -> bool {
        matches!(self, SyncState::Idle)
    }

    /// True while any sync is in flight.
    pub fn is_syncing(self) -> bool {
        !self.can_start_sync()
    }

    /// State after a sync has been accepted.
    pub fn on_sync_started(self, location_id: i64) -> Self {
        SyncState::Syncing { location_id }
    }

    /// State after the in-flight sync finished, failed or was cancelled.
    pub fn on_sync_done(self) -> Self {
        SyncState::Idle
    }
}
