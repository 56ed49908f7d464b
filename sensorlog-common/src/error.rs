//! Common error types for sensorlog

use thiserror::Error;

/// Common result type for sensorlog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the sensorlog crates
#[derive(Error, Debug)]
pub enum Error {
    /// Storage read or write failure (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Sensor is present but cannot be used
    #[error("{0}")]
    InvalidSensor(String),

    /// Live feature requested without a configured sensor
    #[error("No sensor configured")]
    MissingSensor,

    /// Query used a filter outside the recognized set, or a malformed value
    #[error("Invalid query filter: {0}")]
    InvalidQueryFilter(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No session key could be derived from today's keys
    #[error("Key allocation failed: {0}")]
    KeyAllocation(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sensor_message() {
        assert_eq!(Error::MissingSensor.to_string(), "No sensor configured");
    }

    #[test]
    fn test_invalid_sensor_message_is_verbatim() {
        let err = Error::InvalidSensor("serial port /dev/ttyUSB0 not found".to_string());
        assert_eq!(err.to_string(), "serial port /dev/ttyUSB0 not found");
    }
}
