//! Landing page
//!
//! The page is embedded at compile time and filled in per request with the
//! live feed status.

use axum::{extract::State, response::Html};

use crate::sensor::Sensor;
use crate::AppState;

const INDEX_HTML: &str = include_str!("../ui/index.html");

/// GET /
pub async fn serve_index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(state.sensor.as_deref()))
}

/// Fill the page template for the configured sensor (or its absence)
pub fn render_index(sensor: Option<&dyn Sensor>) -> String {
    let (status, name, enabled) = match sensor {
        Some(sensor) => ("Live sensor configured", sensor.name(), "true"),
        None => ("No sensor configured, live feature disabled", "none", "false"),
    };

    INDEX_HTML
        .replace("{{SENSOR_STATUS}}", status)
        .replace("{{SENSOR_NAME}}", name)
        .replace("{{LIVE_ENABLED}}", enabled)
}
