//! End-to-end tests for the `/live` WebSocket endpoint
//!
//! The router is served on an ephemeral port and driven with a real
//! WebSocket client.

use futures::StreamExt;
use sensorlog_common::db::init_memory_database;
use sensorlog_common::Settings;
use sensorlog_web::sensor::{RandomSensor, Sensor};
use sensorlog_web::store::RecordStore;
use sensorlog_web::{build_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Test helper: serve an app on 127.0.0.1:0 and return its state and address
async fn spawn_server(sensor: Option<Arc<dyn Sensor>>, delay: Duration) -> (AppState, String) {
    let settings = Settings {
        sensor_delay: delay,
        ..Settings::default()
    };
    let pool = init_memory_database(&settings.table).await.unwrap();
    let store = RecordStore::new(pool, &settings.table).unwrap();
    let state = AppState::new(store, sensor, settings);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (state, format!("ws://{}/live", addr))
}

async fn next_message(client: &mut Client) -> Option<Message> {
    tokio::time::timeout(READ_TIMEOUT, client.next())
        .await
        .expect("Timed out waiting for server")
        .and_then(|msg| msg.ok())
}

async fn next_json(client: &mut Client) -> Value {
    match next_message(client).await {
        Some(Message::Text(text)) => serde_json::from_str(&text).unwrap(),
        other => panic!("expected text frame, got {:?}", other),
    }
}

#[tokio::test]
async fn test_live_without_sensor_closes_with_error() {
    let (state, url) = spawn_server(None, Duration::from_secs(1)).await;
    let (mut client, _) = connect_async(url).await.unwrap();

    let connected = next_json(&mut client).await;
    assert_eq!(connected["type"], "log");
    assert_eq!(connected["data"]["level"], "info");
    assert_eq!(connected["data"]["message"], "Connected to live feed");

    let error = next_json(&mut client).await;
    assert_eq!(error["data"]["level"], "error");
    assert_eq!(error["data"]["message"], "No sensor configured");

    match next_message(&mut client).await {
        Some(Message::Close(Some(frame))) => {
            assert_eq!(u16::from(frame.code), 1011);
            assert_eq!(frame.reason, "No sensor configured");
        }
        other => panic!("expected close frame, got {:?}", other),
    }

    assert!(state.store.get_keys(sensorlog_common::time::today()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_live_streams_readings_under_new_key() {
    let sensor: Arc<dyn Sensor> = Arc::new(RandomSensor::new(10.0));
    let (state, url) = spawn_server(Some(sensor), Duration::ZERO).await;
    let (mut client, _) = connect_async(url).await.unwrap();

    assert_eq!(next_json(&mut client).await["data"]["message"], "Connected to live feed");
    assert_eq!(next_json(&mut client).await["data"]["message"], "Recording under key A");

    for _ in 0..3 {
        let point = next_json(&mut client).await;
        assert_eq!(point["type"], "data");
        assert_eq!(point["data"]["key"], "A");
        let value = point["data"]["value"].as_f64().unwrap();
        assert!((0.0..10.0).contains(&value), "value {} out of range", value);
        assert!(point["data"]["timestamp"].is_string());
    }

    client.close(None).await.unwrap();
    assert!(state.store.count("A").await.unwrap() >= 3);
}

#[tokio::test]
async fn test_concurrent_sessions_get_distinct_keys() {
    let sensor: Arc<dyn Sensor> = Arc::new(RandomSensor::default());
    let (_state, url) = spawn_server(Some(sensor), Duration::from_secs(3600)).await;

    let (mut first, _) = connect_async(url.clone()).await.unwrap();
    let (mut second, _) = connect_async(url).await.unwrap();

    next_json(&mut first).await;
    next_json(&mut second).await;
    let first_key = next_json(&mut first).await["data"]["message"].clone();
    let second_key = next_json(&mut second).await["data"]["message"].clone();

    assert_ne!(first_key, second_key);
}

#[tokio::test]
async fn test_server_shutdown_ends_live_session() {
    let sensor: Arc<dyn Sensor> = Arc::new(RandomSensor::default());
    let (state, url) = spawn_server(Some(sensor), Duration::from_secs(3600)).await;
    let (mut client, _) = connect_async(url).await.unwrap();

    next_json(&mut client).await; // connected
    next_json(&mut client).await; // recording under key
    assert_eq!(next_json(&mut client).await["type"], "data");

    state.shutdown.cancel();

    // Session is sleeping for an hour; only cancellation can end it
    let ended = matches!(
        next_message(&mut client).await,
        None | Some(Message::Close(_))
    );
    assert!(ended);
}
