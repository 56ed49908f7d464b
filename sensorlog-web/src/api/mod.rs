//! HTTP API handlers for sensorlog

pub mod data;
pub mod error;
pub mod health;
pub mod live;
pub mod ui;

pub use data::{get_keys, get_series, save};
pub use error::{ApiError, ApiResult};
pub use health::health_routes;
pub use live::live;
pub use ui::serve_index;
