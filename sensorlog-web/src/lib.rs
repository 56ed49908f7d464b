//! sensorlog library - sensor data logging service
//!
//! Records readings in SQLite, serves them back over HTTP and streams live
//! sensor samples over a WebSocket.

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use sensorlog_common::db::init_database;
use sensorlog_common::Settings;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod live;
pub mod sensor;
pub mod store;

use sensor::Sensor;
use store::RecordStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Readings table access and key allocation
    pub store: RecordStore,
    /// Configured sensor, `None` disables `/live`
    pub sensor: Option<Arc<dyn Sensor>>,
    pub settings: Arc<Settings>,
    /// Cancelled on server shutdown; live sessions hold child tokens
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create new application state
    pub fn new(store: RecordStore, sensor: Option<Arc<dyn Sensor>>, settings: Settings) -> Self {
        Self {
            store,
            sensor,
            settings: Arc::new(settings),
            shutdown: CancellationToken::new(),
        }
    }
}

/// Version plus the git hash, timestamp and profile captured by build.rs
pub fn build_id() -> String {
    format!(
        "v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    )
}

/// Open the database and build state for the given settings
pub async fn init_state(settings: Settings) -> sensorlog_common::Result<AppState> {
    let pool = init_database(&settings.database_path, &settings.table).await?;
    let store = RecordStore::new(pool, &settings.table)?;
    let sensor = sensor::from_settings(&settings);
    Ok(AppState::new(store, sensor, settings))
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let mut router = Router::new()
        .route("/", get(api::serve_index))
        .route("/save/:key/:value", get(api::save))
        .route("/get", get(api::get_series))
        .route("/get/", get(api::get_series))
        .route("/get/:date", get(api::get_keys))
        .route("/live", get(api::live))
        .merge(api::health_routes());

    if let Some(dir) = &state.settings.static_dir {
        router = router.nest_service("/static", ServeDir::new(dir));
    }

    // Request spans carry the configured logger name
    let service = state.settings.logger.clone();
    let trace = TraceLayer::new_for_http().make_span_with(move |request: &Request<Body>| {
        tracing::info_span!(
            "request",
            service = %service,
            method = %request.method(),
            uri = %request.uri(),
        )
    });

    router
        .layer(trace)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
