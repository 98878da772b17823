//! Gower Tides: tide, surf and weather forecasts for the Gower peninsula.

pub mod controller;
pub mod presenter;
pub mod stores;

pub use controller::{ControllerResult, DaysController, SyncCompletion};
pub use presenter::{describe_day, format_countdown, LogPresenter};
pub use stores::Stores;
