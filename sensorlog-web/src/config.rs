//! Command-line and environment settings
//!
//! Every flag can also come from a `SENSORLOG_*` environment variable. Values
//! given here override the TOML config file, which overrides compiled
//! defaults.

use clap::Parser;
use sensorlog_common::config::{default_config_path, delay_from_secs, SettingsFile};
use sensorlog_common::{Result, SensorKind, Settings};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug, Default)]
#[command(name = "sensorlog")]
#[command(about = "Sensor data logging web service")]
#[command(version)]
pub struct Args {
    /// TOML config file (defaults to <config dir>/sensorlog/config.toml if present)
    #[arg(short, long, env = "SENSORLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, env = "SENSORLOG_DATABASE_URL")]
    pub database: Option<PathBuf>,

    /// Table holding readings
    #[arg(long, env = "SENSORLOG_DATABASE_TABLE")]
    pub table: Option<String>,

    /// Sensor implementation: random | none
    #[arg(long, env = "SENSORLOG_SENSOR")]
    pub sensor: Option<SensorKind>,

    /// Upper bound (exclusive) for the random sensor
    #[arg(long, env = "SENSORLOG_SENSOR_MAX")]
    pub sensor_max: Option<f64>,

    /// Seconds between samples in a live session
    #[arg(long, env = "SENSORLOG_SENSOR_DELAY")]
    pub sensor_delay: Option<f64>,

    /// Logger name attached to every log event
    #[arg(long, env = "SENSORLOG_LOGGER")]
    pub logger: Option<String>,

    /// Address to listen on
    #[arg(short, long, env = "SENSORLOG_BIND")]
    pub bind: Option<String>,

    /// Directory served under /static
    #[arg(long, env = "SENSORLOG_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}

impl Args {
    /// Layer flags over the config file over defaults, then validate
    ///
    /// Without `--config`, `<config dir>/sensorlog/config.toml` is read when it
    /// exists.
    pub fn resolve(self) -> Result<Settings> {
        let fallback = default_config_path().filter(|p| p.exists());
        self.resolve_with(fallback)
    }

    /// `resolve` with the fallback config file supplied by the caller
    fn resolve_with(self, fallback_config: Option<PathBuf>) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(path) = self.config.clone().or(fallback_config) {
            info!("Loading config file: {}", path.display());
            settings = settings.merge_file(SettingsFile::load(&path)?)?;
        }

        if let Some(database) = self.database {
            settings.database_path = database;
        }
        if let Some(table) = self.table {
            settings.table = table;
        }
        if let Some(sensor) = self.sensor {
            settings.sensor = sensor;
        }
        if let Some(max) = self.sensor_max {
            settings.sensor_max = max;
        }
        if let Some(delay) = self.sensor_delay {
            settings.sensor_delay = delay_from_secs(delay)?;
        }
        if let Some(logger) = self.logger {
            settings.logger = logger;
        }
        if let Some(bind) = self.bind {
            settings.bind_addr = bind;
        }
        if self.static_dir.is_some() {
            settings.static_dir = self.static_dir;
        }

        settings.validate()?;
        Ok(settings)
    }
}
