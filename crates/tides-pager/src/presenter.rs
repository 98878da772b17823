//! The presentation layer as seen from the day window.

use tides_store::DayRecord;

use crate::error::PagerError;
use crate::state::WindowState;

/// Receives day window notifications so it can re-render.
///
/// Called synchronously from the window's owner; implementations should
/// only record or schedule UI work.
pub trait Presenter: Send + Sync {
    fn on_state_changed(&self, _state: WindowState) {}

    /// A build finished. `today_index` is the page to show first.
    fn on_window_built(&self, _records: &[DayRecord], _today_index: usize) {}

    fn on_current_changed(&self, _index: usize, _record: &DayRecord) {}

    fn on_record_refreshed(&self, _index: usize, _record: &DayRecord) {}

    /// Render an error state ("day not found", "nothing to show", ...).
    fn on_error(&self, error: &PagerError) {
        tracing::warn!("Day pager error: {}", error);
    }
}

/// Presenter that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn on_error(&self, _error: &PagerError) {}
}
