//! Day pager for Gower Tides.
//!
//! Maintains the bounded window of day records shown in the horizontally
//! scrolling day view: built around "today", navigated one page at a time,
//! and refreshed a few pages at a time after a forecast sync.

pub mod error;
pub mod manager;
pub mod presenter;
pub mod state;

pub use error::{PagerError, PagerResult};
pub use manager::{DaySequenceManager, NeighborLinks, RefreshReport, DEFAULT_CAPACITY};
pub use presenter::{NullPresenter, Presenter};
pub use state::WindowState;
