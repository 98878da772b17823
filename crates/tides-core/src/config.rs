use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Coastal locations offered in the location picker
    #[serde(default = "default_locations")]
    pub locations: Vec<LocationConfig>,

    /// Index into `locations` of the selected location
    #[serde(default)]
    pub location_index: usize,

    /// Day pager settings
    #[serde(default)]
    pub pager: PagerConfig,

    /// Forecast sync settings
    #[serde(default)]
    pub sync: SyncConfig,

    /// Local database settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// A selectable forecast location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Key used by the forecast API and the local stores
    pub key: i64,
    /// Display name
    pub name: String,
}

impl LocationConfig {
    fn new(key: i64, name: &str) -> Self {
        Self {
            key,
            name: name.to_string(),
        }
    }
}

fn default_locations() -> Vec<LocationConfig> {
    vec![
        LocationConfig::new(1, "Llangennith"),
        LocationConfig::new(2, "Rhossili"),
        LocationConfig::new(3, "Caswell Bay"),
        LocationConfig::new(4, "Langland Bay"),
        LocationConfig::new(5, "Three Cliffs Bay"),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagerConfig {
    /// Number of day pages kept in the window
    #[serde(default = "default_days_to_store")]
    pub days_to_store: usize,
}

fn default_days_to_store() -> usize {
    40
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            days_to_store: default_days_to_store(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Forecast API endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Fetch fresh forecasts once the day pager is ready
    #[serde(default = "default_sync_on_startup")]
    pub sync_on_startup: bool,

    /// HTTP timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://gowertides.willwebberley.net/api".to_string()
}

fn default_sync_on_startup() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            sync_on_startup: default_sync_on_startup(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the day and weather databases
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gowertides")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    pub fn day_db_path(&self) -> PathBuf {
        self.data_dir.join("days.sqlite")
    }

    pub fn weather_db_path(&self) -> PathBuf {
        self.data_dir.join("weather.sqlite")
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("gowertides");

        Self {
            config_dir,
            locations: default_locations(),
            location_index: 0,
            pager: PagerConfig::default(),
            sync: SyncConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, writing defaults there if missing.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.locations.is_empty() {
            result.add_error("locations", "At least one location must be configured");
        } else if self.location_index >= self.locations.len() {
            result.add_error(
                "location_index",
                format!(
                    "Index {} is out of range for {} locations",
                    self.location_index,
                    self.locations.len()
                ),
            );
        }

        let mut keys: Vec<i64> = self.locations.iter().map(|l| l.key).collect();
        keys.sort_unstable();
        keys.dedup();
        if keys.len() != self.locations.len() {
            result.add_error("locations", "Location keys must be unique");
        }

        if self.pager.days_to_store == 0 {
            result.add_error("pager.days_to_store", "Must keep at least one day");
        } else if self.pager.days_to_store > 366 {
            result.add_warning(
                "pager.days_to_store",
                "More than a year of day pages will be slow to build",
            );
        }

        self.validate_url(&self.sync.api_url, "sync.api_url", &mut result);

        if self.sync.timeout_secs == 0 {
            result.add_error("sync.timeout_secs", "Timeout must be greater than 0");
        } else if self.sync.timeout_secs > 300 {
            result.add_warning("sync.timeout_secs", "Timeout is longer than 5 minutes");
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// The currently selected location, falling back to the first one.
    pub fn selected_location(&self) -> Option<&LocationConfig> {
        self.locations
            .get(self.location_index)
            .or_else(|| self.locations.first())
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("gowertides");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
        assert_eq!(config.pager.days_to_store, 40);
        assert!(config.sync.sync_on_startup);
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.sync.api_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "sync.api_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.sync.api_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_days_to_store() {
        let mut config = Config::default();
        config.pager.days_to_store = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "pager.days_to_store"));
    }

    #[test]
    fn test_location_index_out_of_range() {
        let mut config = Config::default();
        config.location_index = config.locations.len();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "location_index"));
        // Falls back to the first location rather than failing
        assert_eq!(config.selected_location().map(|l| l.key), Some(1));
    }

    #[test]
    fn test_duplicate_location_keys() {
        let mut config = Config::default();
        config.locations.push(LocationConfig::new(1, "Duplicate"));
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.message.contains("unique")));
    }

    #[test]
    fn test_large_window_is_warning() {
        let mut config = Config::default();
        config.pager.days_to_store = 400;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "pager.days_to_store"));
    }

    #[test]
    fn test_load_creates_default_then_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_from(&path).unwrap();
        assert!(path.exists());

        let mut edited = created.clone();
        edited.location_index = 3;
        edited.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.location_index, 3);
        assert_eq!(reloaded.locations, created.locations);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "config_dir = \"/tmp/gowertides\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.pager.days_to_store, 40);
        assert_eq!(config.locations.len(), 5);
        assert_eq!(config.location_index, 0);
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
