//! Text rendering of day pages.
//!
//! `LogPresenter` writes every pager event to the log; the formatting
//! helpers are shared with the command-line front end.

use chrono::{Duration, Local, NaiveDateTime};

use tides_core::AppError;
use tides_pager::{PagerError, Presenter, WindowState};
use tides_store::{DayRecord, TideKind};

/// Presenter that reports pager events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn on_state_changed(&self, state: WindowState) {
        tracing::debug!("Day pager is {}", state);
    }

    fn on_window_built(&self, records: &[DayRecord], today_index: usize) {
        if let (Some(first), Some(last)) = (records.first(), records.last()) {
            tracing::info!(
                "Showing {} days ({} to {}), today is page {}",
                records.len(),
                first.date,
                last.date,
                today_index + 1
            );
        }
    }

    fn on_current_changed(&self, _index: usize, record: &DayRecord) {
        let now = Local::now().naive_local();
        tracing::info!("{}", describe_day(record, Some(now)));
    }

    fn on_record_refreshed(&self, _index: usize, record: &DayRecord) {
        tracing::debug!("Updated {}", record.date);
    }

    fn on_error(&self, error: &PagerError) {
        let message = AppError::from(error.clone()).user_message();
        tracing::warn!("{} ({})", message, error);
    }
}

/// One-line summary of a day: date, tides, weather and the surf range.
///
/// When `now` falls on the record's date, each tide is followed by a
/// countdown such as `(-1h 20m)`.
pub fn describe_day(record: &DayRecord, now: Option<NaiveDateTime>) -> String {
    let mut parts = vec![record.date.format("%a %-d %b").to_string()];

    let today_now = now.filter(|n| n.date() == record.date);
    let tides: Vec<String> = record
        .tides
        .iter()
        .map(|tide| {
            let label = match tide.kind {
                TideKind::High => "HW",
                TideKind::Low => "LW",
            };
            let mut text = format!("{} {} ({:.1}m)", label, tide.time.format("%H:%M"), tide.height_m);
            if let Some(now) = today_now {
                text.push_str(&format!(" ({})", format_countdown(tide.time_until(record.date, now))));
            }
            text
        })
        .collect();
    if !tides.is_empty() {
        parts.push(tides.join(", "));
    }

    if let Some(weather) = &record.weather {
        parts.push(format!(
            "{} {:.0}/{:.0}°C, wind {:.0}mph {}",
            weather.description,
            weather.max_temp_c,
            weather.min_temp_c,
            weather.wind_speed_mph,
            weather.wind_direction
        ));
    }

    let min = record.surf.iter().map(|s| s.min_surf_ft).reduce(f64::min);
    let max = record.surf.iter().map(|s| s.max_surf_ft).reduce(f64::max);
    if let (Some(min), Some(max)) = (min, max) {
        if (max - min).abs() < f64::EPSILON {
            parts.push(format!("surf {min:.0}ft"));
        } else {
            parts.push(format!("surf {min:.0}-{max:.0}ft"));
        }
    }

    parts.join(" | ")
}

/// Signed hours and minutes, e.g. `+2h 05m` or `-0h 40m`.
pub fn format_countdown(delta: Duration) -> String {
    let sign = if delta < Duration::zero() { '-' } else { '+' };
    let minutes = delta.num_minutes().abs();
    format!("{}{}h {:02}m", sign, minutes / 60, minutes % 60)
}
