//! Local forecast storage for Gower Tides.
//!
//! Provides the day and weather record types, the `DayStore` and
//! `WeatherStore` capabilities consumed by the day pager and the sync task,
//! and their SQLite implementations.

pub mod day_store;
pub mod error;
pub mod store;
pub mod types;
pub mod weather_store;

pub use day_store::SqliteDayStore;
pub use error::{StoreError, StoreResult};
pub use store::{DayStore, WeatherStore};
pub use types::*;
pub use weather_store::SqliteWeatherStore;
