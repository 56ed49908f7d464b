//! Sensor sources for the live feed
//!
//! A sensor produces one number per `read()`. `validate()` is called before a
//! live session starts sampling; hardware-backed sensors report a missing or
//! unusable device there.

use rand::Rng;
use sensorlog_common::{Result, SensorKind, Settings};
use std::sync::Arc;

pub trait Sensor: Send + Sync {
    /// Display name for the landing page and logs
    fn name(&self) -> &str;

    /// Take one sample
    fn read(&self) -> f64;

    /// Fails with `Error::InvalidSensor` when the sensor cannot be used
    fn validate(&self) -> Result<()>;
}

/// Stand-in for real hardware: uniform values in `[0, max)`
#[derive(Debug, Clone)]
pub struct RandomSensor {
    max: f64,
}

impl RandomSensor {
    pub fn new(max: f64) -> Self {
        Self { max }
    }
}

impl Default for RandomSensor {
    fn default() -> Self {
        Self::new(sensorlog_common::config::DEFAULT_SENSOR_MAX)
    }
}

impl Sensor for RandomSensor {
    fn name(&self) -> &str {
        "Random Sensor"
    }

    fn read(&self) -> f64 {
        // gen::<f64>() is in [0, 1), so the product never reaches max
        rand::thread_rng().gen::<f64>() * self.max
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Build the sensor selected in settings; `None` disables the live feed
pub fn from_settings(settings: &Settings) -> Option<Arc<dyn Sensor>> {
    match settings.sensor {
        SensorKind::Random => Some(Arc::new(RandomSensor::new(settings.sensor_max))),
        SensorKind::None => None,
    }
}

/// Startup check: a configured sensor must validate before the server binds
pub fn check_at_startup(sensor: Option<&Arc<dyn Sensor>>) -> Result<()> {
    match sensor {
        Some(sensor) => {
            sensor.validate()?;
            tracing::info!("Sensor successfully validated: {}", sensor.name());
        }
        None => tracing::warn!("No sensor found, live feature disabled"),
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sensorlog_common::Error;

    /// Sensor whose validation always fails, as a disconnected device would
    pub(crate) struct UnpluggedSensor;

    impl Sensor for UnpluggedSensor {
        fn name(&self) -> &str {
            "Unplugged"
        }

        fn read(&self) -> f64 {
            0.0
        }

        fn validate(&self) -> Result<()> {
            Err(Error::InvalidSensor("Sensor device not found".to_string()))
        }
    }

    #[test]
    fn test_random_sensor_stays_in_range() {
        let sensor = RandomSensor::new(5.0);
        for _ in 0..1000 {
            let v = sensor.read();
            assert!((0.0..5.0).contains(&v), "value {} out of range", v);
        }
    }

    #[test]
    fn test_random_sensor_always_validates() {
        assert!(RandomSensor::default().validate().is_ok());
        assert_eq!(RandomSensor::default().max, 100.0);
    }

    #[test]
    fn test_from_settings_selects_variant() {
        let settings = Settings::default();
        let sensor = from_settings(&settings).expect("random sensor by default");
        assert_eq!(sensor.name(), "Random Sensor");

        let disabled = Settings {
            sensor: SensorKind::None,
            ..Settings::default()
        };
        assert!(from_settings(&disabled).is_none());
    }

    #[test]
    fn test_startup_check() {
        assert!(check_at_startup(None).is_ok());

        let good: Arc<dyn Sensor> = Arc::new(RandomSensor::default());
        assert!(check_at_startup(Some(&good)).is_ok());

        let bad: Arc<dyn Sensor> = Arc::new(UnpluggedSensor);
        let err = check_at_startup(Some(&bad)).unwrap_err();
        assert_eq!(err.to_string(), "Sensor device not found");
    }
}
