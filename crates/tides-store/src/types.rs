use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// High or low water
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TideKind {
    High,
    Low,
}

impl TideKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }

    /// Parse the stored representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "high" => Some(Self::High),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// A single high or low tide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tide {
    pub time: NaiveTime,
    pub height_m: f64,
    pub kind: TideKind,
}

impl Tide {
    pub fn new(time: NaiveTime, height_m: f64, kind: TideKind) -> Self {
        Self {
            time,
            height_m,
            kind,
        }
    }

    /// Signed time from `now` until this tide on `date`.
    ///
    /// Negative once the tide has passed.
    pub fn time_until(&self, date: NaiveDate, now: NaiveDateTime) -> Duration {
        date.and_time(self.time) - now
    }
}

/// Hourly surf forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfForecast {
    pub hour: u8,
    pub min_surf_ft: f64,
    pub max_surf_ft: f64,
    pub abs_min_surf_ft: f64,
    pub abs_max_surf_ft: f64,
    pub swell_height_ft: f64,
    pub swell_period_s: f64,
    pub swell_angle_deg: f64,
    /// Compass label, e.g. "WSW"
    pub swell_direction: String,
}

impl SurfForecast {
    /// True when the forecast is a single size rather than a range
    pub fn is_flat_range(&self) -> bool {
        (self.max_surf_ft - self.min_surf_ft).abs() < f64::EPSILON
    }
}

/// Daily weather summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub date: NaiveDate,
    pub max_temp_c: f64,
    pub min_temp_c: f64,
    pub wind_speed_mph: f64,
    pub wind_direction: String,
    pub precipitation_mm: f64,
    pub description: String,
    pub icon: String,
}

/// One calendar day of forecast data for one location.
///
/// Neighbouring days are not referenced from here; the day pager links
/// records by their position in its window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub location_id: i64,
    #[serde(default)]
    pub tides: Vec<Tide>,
    #[serde(default)]
    pub surf: Vec<SurfForecast>,
    #[serde(default)]
    pub weather: Option<WeatherSnapshot>,
}

impl DayRecord {
    /// A record with no payload yet
    pub fn new(date: NaiveDate, location_id: i64) -> Self {
        Self {
            date,
            location_id,
            tides: Vec::new(),
            surf: Vec::new(),
            weather: None,
        }
    }

    /// True if any weather or surf data has been synced for this day
    pub fn has_forecast(&self) -> bool {
        self.weather.is_some() || !self.surf.is_empty()
    }

    /// The first tide at or after `now`, if it falls on this day
    pub fn next_tide(&self, now: NaiveDateTime) -> Option<&Tide> {
        self.tides
            .iter()
            .find(|t| t.time_until(self.date, now) >= Duration::zero())
    }

    /// Surf forecast for a given hour of the day
    pub fn surf_at(&self, hour: u8) -> Option<&SurfForecast> {
        self.surf.iter().find(|s| s.hour == hour)
    }
}
