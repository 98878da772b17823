//! Forecast sync for Gower Tides.
//!
//! Fetches weather and surf forecasts for a location, stores them in the
//! weather store and reports completion back to the owning thread.

pub mod client;
pub mod error;
pub mod payload;
pub mod retry;
pub mod syncer;

pub use client::ForecastClient;
pub use error::{SyncError, SyncResult};
pub use payload::{ForecastPayload, SurfDay, SyncSummary};
pub use retry::{with_retry, RetryConfig};
pub use syncer::{SyncMessage, SyncRequest, Syncer};
