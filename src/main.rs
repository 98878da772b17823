use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use gowertides::{describe_day, DaysController, LogPresenter, Stores};
use tides_core::Config;
use tides_sync::ForecastClient;

fn main() -> Result<()> {
    tides_core::init()?;

    let (config, _validation) = Config::load_validated()?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let stores = Stores::open(&config.storage)?;
    let client = ForecastClient::from_config(&config.sync)?;
    let sync_timeout = Duration::from_secs(config.sync.timeout_secs.saturating_mul(4));

    let mut controller = DaysController::new(
        config,
        stores,
        client,
        runtime.handle().clone(),
        Arc::new(LogPresenter),
    )?
    .with_config_path(Config::config_path()?);

    if let Some(location) = controller.location() {
        println!("Gower Tides - {}", location.name);
    }

    let today = chrono::Local::now().date_naive();
    if let Err(e) = controller.startup(today) {
        eprintln!("{}", e.user_message());
        return Err(e.into());
    }
    controller.resume()?;

    if controller.is_syncing() {
        if let Some(done) = controller.wait_for_sync(sync_timeout) {
            if let Err(e) = &done.result {
                eprintln!("{}", e.user_message());
            }
        }
    }

    let now = chrono::Local::now().naive_local();
    let manager = controller.manager();
    let current = manager.current_index();
    for index in current.saturating_sub(1)..=current + 1 {
        if let Some(record) = manager.get(index) {
            let marker = if manager.is_today(index) { ">" } else { " " };
            println!("{} {}", marker, describe_day(record, Some(now)));
        }
    }

    controller.pause();
    tracing::info!("Gower Tides shutting down");
    Ok(())
}
