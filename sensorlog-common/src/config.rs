//! Settings loading and validation
//!
//! Resolution order (highest priority first):
//! 1. Command-line argument / environment variable (handled by the binary)
//! 2. TOML config file
//! 3. Compiled defaults

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DATABASE_PATH: &str = "data.sqlite3";
pub const DEFAULT_TABLE: &str = "SensorData";
pub const DEFAULT_SENSOR_MAX: f64 = 100.0;
pub const DEFAULT_SENSOR_DELAY_SECS: f64 = 2.0;
pub const DEFAULT_LOGGER: &str = "sensorlog";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Which sensor implementation backs the live feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// Uniform random values in `[0, sensor_max)`
    Random,
    /// Live feature disabled
    None,
}

impl FromStr for SensorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(SensorKind::Random),
            "none" | "" => Ok(SensorKind::None),
            other => Err(Error::Config(format!(
                "Unknown sensor '{}' (expected 'random' or 'none')",
                other
            ))),
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Random => write!(f, "random"),
            SensorKind::None => write!(f, "none"),
        }
    }
}

/// Process-wide settings, built once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// SQLite database file
    pub database_path: PathBuf,
    /// Table holding readings; interpolated into SQL, so always a plain identifier
    pub table: String,
    pub sensor: SensorKind,
    /// Upper bound (exclusive) for the random sensor
    pub sensor_max: f64,
    /// Delay between samples in a live session
    pub sensor_delay: Duration,
    /// Name attached to every log event
    pub logger: String,
    pub bind_addr: String,
    /// Optional directory served under /static
    pub static_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            table: DEFAULT_TABLE.to_string(),
            sensor: SensorKind::Random,
            sensor_max: DEFAULT_SENSOR_MAX,
            sensor_delay: Duration::from_secs_f64(DEFAULT_SENSOR_DELAY_SECS),
            logger: DEFAULT_LOGGER.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            static_dir: None,
        }
    }
}

/// On-disk TOML layout; every field optional so files can be partial
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    pub database_url: Option<PathBuf>,
    pub database_table: Option<String>,
    pub sensor: Option<SensorKind>,
    pub sensor_max: Option<f64>,
    pub sensor_delay: Option<f64>,
    pub logger: Option<String>,
    pub bind: Option<String>,
    pub static_dir: Option<PathBuf>,
}

impl SettingsFile {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

impl Settings {
    /// Overlay values present in a config file onto these settings
    pub fn merge_file(mut self, file: SettingsFile) -> Result<Self> {
        if let Some(path) = file.database_url {
            self.database_path = path;
        }
        if let Some(table) = file.database_table {
            self.table = table;
        }
        if let Some(sensor) = file.sensor {
            self.sensor = sensor;
        }
        if let Some(max) = file.sensor_max {
            self.sensor_max = max;
        }
        if let Some(delay) = file.sensor_delay {
            self.sensor_delay = delay_from_secs(delay)?;
        }
        if let Some(logger) = file.logger {
            self.logger = logger;
        }
        if let Some(bind) = file.bind {
            self.bind_addr = bind;
        }
        if file.static_dir.is_some() {
            self.static_dir = file.static_dir;
        }
        Ok(self)
    }

    /// Check invariants that later code relies on
    pub fn validate(&self) -> Result<()> {
        if !is_valid_table_name(&self.table) {
            return Err(Error::Config(format!("Invalid table name: {}", self.table)));
        }
        if self.sensor == SensorKind::Random
            && !(self.sensor_max.is_finite() && self.sensor_max > 0.0)
        {
            return Err(Error::Config(format!(
                "sensor_max must be a positive number, got {}",
                self.sensor_max
            )));
        }
        if self.logger.trim().is_empty() {
            return Err(Error::Config("logger name must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Convert a seconds value from config into a sampling delay
pub fn delay_from_secs(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .map_err(|_| Error::Config(format!("sensor_delay must be >= 0 seconds, got {}", secs)))
}

/// Table names are spliced into SQL text, so only plain identifiers pass
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    name.len() < 64 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Default config file location: `<config_dir>/sensorlog/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("sensorlog").join("config.toml"))
}
