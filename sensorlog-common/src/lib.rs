//! # sensorlog Common Library
//!
//! Shared code for the sensorlog service:
//! - Error type
//! - Settings model and TOML loading
//! - Database initialization and row models
//! - Live feed message types
//! - Date/time helpers

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod time;

pub use config::{SensorKind, Settings};
pub use error::{Error, Result};
pub use events::LiveMessage;
