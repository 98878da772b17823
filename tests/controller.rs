//! End-to-end tests for DaysController against in-memory stores and a mock
//! forecast server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gowertides::{DaysController, LogPresenter, Stores};
use tides_core::{AppError, Config, ConfigError, ForecastError};
use tides_pager::WindowState;
use tides_store::{
    SqliteDayStore, SqliteWeatherStore, Tide, TideKind, WeatherSnapshot, WeatherStore,
};
use tides_sync::{ForecastClient, RetryConfig, SyncError, SyncRequest};

const WAIT: Duration = Duration::from_secs(10);

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

fn weather_json(d: u32, description: &str) -> serde_json::Value {
    serde_json::json!({
        "date": format!("2024-06-{d:02}"),
        "max_temp_c": 18.0,
        "min_temp_c": 11.0,
        "wind_speed_mph": 10.0,
        "wind_direction": "W",
        "precipitation_mm": 0.0,
        "description": description,
        "icon": "sun"
    })
}

fn snapshot(d: u32, description: &str) -> WeatherSnapshot {
    serde_json::from_value(weather_json(d, description)).unwrap()
}

fn forecast(description: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "weather": [
            weather_json(14, description),
            weather_json(15, description),
            weather_json(16, description)
        ],
        "surf": []
    }))
}

struct Harness {
    server: MockServer,
    weather: Arc<SqliteWeatherStore>,
    days: Arc<SqliteDayStore>,
    dir: tempfile::TempDir,
    runtime: Runtime,
}

impl Harness {
    fn new() -> Self {
        Self::with_tides(1..=30)
    }

    fn with_tides(range: std::ops::RangeInclusive<u32>) -> Self {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        let weather = Arc::new(SqliteWeatherStore::in_memory().unwrap());
        let days = Arc::new(SqliteDayStore::in_memory(weather.clone()).unwrap());
        let high = Tide::new(NaiveTime::from_hms_opt(9, 30, 0).unwrap(), 8.2, TideKind::High);
        for d in range {
            days.import_tides(date(d), &[high.clone()]).unwrap();
        }
        Self {
            server,
            weather,
            days,
            dir: tempfile::tempdir().unwrap(),
            runtime,
        }
    }

    fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    fn config_path(&self) -> std::path::PathBuf {
        self.dir.path().join("config.toml")
    }

    fn controller(&self, sync_on_startup: bool) -> DaysController {
        let mut config = Config::default();
        config.sync.api_url = format!("{}/api", self.server.uri());
        config.sync.sync_on_startup = sync_on_startup;

        let client = ForecastClient::from_config(&config.sync)
            .unwrap()
            .with_retry_config(RetryConfig::none());
        let stores = Stores::new(self.days.clone(), self.weather.clone());
        DaysController::new(
            config,
            stores,
            client,
            self.runtime.handle().clone(),
            Arc::new(LogPresenter),
        )
        .unwrap()
        .with_config_path(self.config_path())
    }
}

#[test]
fn test_startup_builds_window_and_syncs() {
    let harness = Harness::new();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("location", "1"))
            .respond_with(forecast("Sunny")),
    );
    let mut controller = harness.controller(true);

    controller.startup(date(15)).unwrap();
    assert_eq!(controller.manager().state(), WindowState::Ready);
    assert_eq!(controller.manager().today_index(), Some(10));
    assert!(controller.current().unwrap().weather.is_none());

    let done = controller.wait_for_sync(WAIT).expect("sync finished");
    assert_eq!(done.location_id, 1);
    assert!(done.result.is_ok());
    assert_eq!(done.refresh.unwrap().refreshed, vec![10, 9, 11]);

    let today = controller.current().unwrap();
    assert_eq!(today.weather.as_ref().unwrap().description, "Sunny");
    assert!(controller.manager().tomorrow_of(10).unwrap().weather.is_some());
    // Outside the refreshed neighbourhood the cached record is unchanged
    assert!(controller.manager().get(12).unwrap().weather.is_none());
}

#[test]
fn test_startup_without_sync() {
    let harness = Harness::new();
    let mut controller = harness.controller(false);

    controller.startup(date(15)).unwrap();
    assert!(!controller.is_syncing());
    assert!(controller.poll_sync().is_empty());
}

#[test]
fn test_startup_without_tides_reports_unavailable() {
    let harness = Harness::with_tides(1..=0);
    let mut controller = harness.controller(true);

    let err = controller.startup(date(15)).unwrap_err();
    assert!(matches!(
        err,
        AppError::Forecast(ForecastError::DataUnavailable(_))
    ));
    assert_eq!(err.user_message(), "No tide data is available yet.");
    assert!(!controller.is_syncing());
}

#[test]
fn test_navigation() {
    let harness = Harness::new();
    let mut controller = harness.controller(false);
    controller.startup(date(15)).unwrap();

    assert_eq!(controller.next_day().unwrap().date, date(16));
    assert_eq!(controller.next_day().unwrap().date, date(17));
    assert_eq!(controller.previous_day().unwrap().date, date(16));
    assert_eq!(controller.to_today().unwrap().date, date(15));

    for _ in 0..10 {
        controller.previous_day().unwrap();
    }
    assert_eq!(controller.current().unwrap().date, date(5));

    let err = controller.previous_day().unwrap_err();
    assert!(matches!(err, AppError::Forecast(ForecastError::DayNotFound)));
    assert_eq!(err.user_message(), "Could not load day.");
    assert_eq!(controller.current().unwrap().date, date(5));
}

#[test]
fn test_failed_sync_still_refreshes() {
    let harness = Harness::new();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(500)),
    );
    let mut controller = harness.controller(true);
    controller.startup(date(15)).unwrap();
    assert!(controller.current().unwrap().weather.is_none());

    // Weather that arrived some other way is picked up by the refresh
    harness.weather.store_weather(1, &[snapshot(15, "Cloudy")]).unwrap();

    let done = controller.wait_for_sync(WAIT).expect("sync finished");
    assert!(matches!(done.result, Err(SyncError::Status { status: 500, .. })));
    assert_eq!(done.refresh.unwrap().refreshed.len(), 3);
    assert_eq!(
        controller.current().unwrap().weather.as_ref().unwrap().description,
        "Cloudy"
    );
}

#[test]
fn test_sync_is_not_reentrant() {
    let harness = Harness::new();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(forecast("Sunny").set_delay(Duration::from_millis(300)))
            .expect(1),
    );
    let mut controller = harness.controller(true);
    controller.startup(date(15)).unwrap();

    assert_eq!(controller.request_sync(), SyncRequest::AlreadyRunning);
    assert!(controller.wait_for_sync(WAIT).is_some());
    assert!(controller.poll_sync().is_empty());
}

#[test]
fn test_update_location_rebuilds_syncs_and_saves() {
    let harness = Harness::new();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("location", "3"))
            .respond_with(forecast("Caswell sun")),
    );
    let mut controller = harness.controller(false);
    controller.startup(date(15)).unwrap();
    controller.next_day().unwrap();

    let report = controller.update_location(2).unwrap();
    assert!(report.is_complete());
    assert_eq!(controller.manager().location_id(), 3);
    assert_eq!(controller.manager().reference_date(), Some(date(15)));
    assert_eq!(controller.current().unwrap().date, date(15));
    assert_eq!(controller.location().unwrap().name, "Caswell Bay");

    let done = controller.wait_for_sync(WAIT).expect("sync finished");
    assert_eq!(done.location_id, 3);
    assert!(done.refresh.is_some());
    assert_eq!(
        controller.current().unwrap().weather.as_ref().unwrap().description,
        "Caswell sun"
    );

    let saved = Config::load_from(&harness.config_path()).unwrap();
    assert_eq!(saved.location_index, 2);
}

#[test]
fn test_update_location_unknown_index() {
    let harness = Harness::new();
    let mut controller = harness.controller(false);
    controller.startup(date(15)).unwrap();

    let err = controller.update_location(99).unwrap_err();
    assert!(matches!(
        err,
        AppError::Config(ConfigError::UnknownLocation(99))
    ));
    assert_eq!(controller.manager().location_id(), 1);
    assert!(!harness.config_path().exists());
}

#[test]
fn test_pause_cancels_sync() {
    let harness = Harness::new();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(forecast("Sunny").set_delay(Duration::from_secs(5))),
    );
    let mut controller = harness.controller(true);
    controller.startup(date(15)).unwrap();
    assert!(controller.is_syncing());

    controller.pause();
    let done = controller.wait_for_sync(WAIT).expect("sync finished");
    assert!(matches!(done.result, Err(SyncError::Cancelled)));
    assert!(!controller.is_syncing());
    assert!(harness.weather.last_synced(1).unwrap().is_none());
}

#[test]
fn test_resume_refreshes_after_first() {
    let harness = Harness::new();
    let mut controller = harness.controller(false);
    controller.startup(date(15)).unwrap();

    assert!(controller.resume().unwrap().is_none());

    harness
        .weather
        .store_weather(1, &[snapshot(16, "Drizzle")])
        .unwrap();
    controller.pause();
    let report = controller.resume().unwrap().expect("second resume refreshes");
    assert_eq!(report.refreshed, vec![10, 9, 11]);
    assert!(controller.manager().tomorrow_of(10).unwrap().weather.is_some());
}

#[test]
fn test_startup_uses_fresh_build_token() {
    let harness = Harness::new();
    let mut controller = harness.controller(false);

    controller.build_cancel_token().cancel();
    // startup replaces the token, so this build runs to completion
    controller.startup(date(15)).unwrap();
    assert_eq!(controller.manager().state(), WindowState::Ready);
}
