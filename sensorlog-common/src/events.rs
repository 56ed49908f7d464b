//! Messages pushed to live feed clients
//!
//! Every frame is a JSON object tagged by `type`:
//! `{"type":"log","data":{...}}` or `{"type":"data","data":{...}}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a log message sent to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// Status text for the client's log pane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// One sample as it was persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub key: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Live feed message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum LiveMessage {
    Log(LogEntry),
    Data(DataPoint),
}

impl LiveMessage {
    pub fn info(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Error, message)
    }

    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        LiveMessage::Log(LogEntry {
            level,
            message: message.into(),
        })
    }

    pub fn data(key: impl Into<String>, value: f64, timestamp: DateTime<Utc>) -> Self {
        LiveMessage::Data(DataPoint {
            key: key.into(),
            value,
            timestamp,
        })
    }
}
