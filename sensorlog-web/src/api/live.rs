//! WebSocket transport for live sessions
//!
//! # Endpoint
//!
//! - `GET /live` - WebSocket upgrade; the server drives the conversation
//!
//! # Protocol
//!
//! Server sends JSON text frames (`{"type":"log",...}` / `{"type":"data",...}`)
//! and closes with code 1011 when the session cannot run. Anything the
//! client sends is ignored apart from Close.

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::borrow::Cow;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn, Instrument, Span};

use crate::live::{Frame, LiveSession};
use crate::AppState;

/// Frames queued between the session and the socket writer
const FRAME_BUFFER: usize = 32;

/// WebSocket upgrade handler: `GET /live`
pub async fn live(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let span = Span::current();
    ws.on_upgrade(move |socket| handle_socket(socket, state).instrument(span))
}

/// Run one live session over a WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    info!("Live client connected");

    let (mut sender, mut receiver) = socket.split();
    // Child of the server token so shutdown ends every session
    let cancel = state.shutdown.child_token();
    let (tx, mut rx) = mpsc::channel::<Frame>(FRAME_BUFFER);

    let session = LiveSession::new(
        state.store.clone(),
        state.sensor.clone(),
        state.settings.sensor_delay,
    );
    let session_task = tokio::spawn(session.run(tx, cancel.clone()).in_current_span());

    // Forward session frames to the client
    let send_cancel = cancel.clone();
    let send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let Some(message) = to_ws_message(frame) else {
                continue;
            };
            if sender.send(message).await.is_err() {
                send_cancel.cancel(); // Client disconnected
                break;
            }
        }
    });

    // Watch for the client going away
    let recv_cancel = cancel.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    debug!("Live socket error: {}", e);
                    break;
                }
                _ => {} // Ignore text/binary/ping/pong
            }
        }
        recv_cancel.cancel();
    });

    match session_task.await {
        Ok(end) => debug!("Live session finished: {:?}", end),
        Err(e) => {
            error!("Live session task failed: {}", e);
            cancel.cancel();
        }
    }

    // Session dropped its sender, so the writer drains and stops
    let _ = send_task.await;
    recv_task.abort();
    info!("Live client disconnected");
}

/// Encode a session frame for the socket
fn to_ws_message(frame: Frame) -> Option<Message> {
    match frame {
        Frame::Message(message) => match serde_json::to_string(&message) {
            Ok(json) => Some(Message::Text(json)),
            Err(e) => {
                warn!("Failed to serialize live message: {}", e);
                None
            }
        },
        Frame::Close { code, reason } => Some(Message::Close(Some(CloseFrame {
            code,
            reason: Cow::Owned(reason),
        }))),
    }
}
