//! Live session loop
//!
//! One session per streaming client:
//!
//! ```text
//! Connecting -> ValidatingSensor -> Allocating -> Streaming -> Closed
//!                      |                 |             |
//!                      +-----------------+-------------+--> Closed (1011)
//! ```
//!
//! The loop knows nothing about WebSockets. It pushes [`Frame`]s into an mpsc
//! channel and watches a cancellation token; the transport forwards frames
//! and cancels the token when the client goes away. The session only suspends
//! on the sampling delay and on channel sends.

use crate::sensor::Sensor;
use crate::store::RecordStore;
use sensorlog_common::time::now;
use sensorlog_common::{Error, LiveMessage};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// WebSocket "internal error" close code, used for every failed session
pub const CLOSE_INTERNAL_ERROR: u16 = 1011;

/// Close reasons must fit in a control frame (125 bytes minus the code)
const MAX_CLOSE_REASON_BYTES: usize = 123;

/// What the session asks the transport to do
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Message(LiveMessage),
    Close { code: u16, reason: String },
}

/// How a session ended
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEnd {
    /// Client closed or the transport failed
    Disconnected,
    /// Server closed the session with a reason
    Failed { code: u16, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Connecting,
    ValidatingSensor,
    Allocating,
    Streaming { key: String },
    Closed(SessionEnd),
}

pub struct LiveSession {
    store: RecordStore,
    sensor: Option<Arc<dyn Sensor>>,
    delay: Duration,
}

impl LiveSession {
    pub fn new(store: RecordStore, sensor: Option<Arc<dyn Sensor>>, delay: Duration) -> Self {
        Self { store, sensor, delay }
    }

    /// Drive the session to completion
    pub async fn run(self, tx: mpsc::Sender<Frame>, cancel: CancellationToken) -> SessionEnd {
        let mut state = SessionState::Connecting;

        loop {
            debug!("Live session state: {:?}", state);
            state = match state {
                SessionState::Connecting => {
                    if emit(&tx, &cancel, LiveMessage::info("Connected to live feed")).await {
                        SessionState::ValidatingSensor
                    } else {
                        SessionState::Closed(SessionEnd::Disconnected)
                    }
                }
                SessionState::ValidatingSensor => match self.validate_sensor() {
                    Ok(()) => SessionState::Allocating,
                    Err(e) => fail(&tx, &cancel, e).await,
                },
                SessionState::Allocating => match self.store.generate_key().await {
                    Ok(key) => {
                        let announced = format!("Recording under key {}", key);
                        if emit(&tx, &cancel, LiveMessage::info(announced)).await {
                            SessionState::Streaming { key }
                        } else {
                            SessionState::Closed(SessionEnd::Disconnected)
                        }
                    }
                    Err(e) => fail(&tx, &cancel, e).await,
                },
                SessionState::Streaming { key } => self.stream(&key, &tx, &cancel).await,
                SessionState::Closed(end) => {
                    match &end {
                        SessionEnd::Disconnected => debug!("Live session ended: client disconnected"),
                        SessionEnd::Failed { reason, .. } => info!("Live session closed: {}", reason),
                    }
                    return end;
                }
            };
        }
    }

    fn validate_sensor(&self) -> Result<(), Error> {
        match &self.sensor {
            Some(sensor) => sensor.validate(),
            None => Err(Error::MissingSensor),
        }
    }

    /// Read → persist → publish → sleep, until cancelled or storage fails
    async fn stream(
        &self,
        key: &str,
        tx: &mpsc::Sender<Frame>,
        cancel: &CancellationToken,
    ) -> SessionState {
        let Some(sensor) = self.sensor.as_ref() else {
            return fail(tx, cancel, Error::MissingSensor).await;
        };
        info!("Streaming {} under key {} every {:?}", sensor.name(), key, self.delay);

        loop {
            if cancel.is_cancelled() {
                return SessionState::Closed(SessionEnd::Disconnected);
            }

            let value = sensor.read();
            if let Err(e) = self.store.save(key, value).await {
                return fail(tx, cancel, e).await;
            }

            if !emit(tx, cancel, LiveMessage::data(key, value, now())).await {
                return SessionState::Closed(SessionEnd::Disconnected);
            }

            tokio::select! {
                _ = cancel.cancelled() => return SessionState::Closed(SessionEnd::Disconnected),
                _ = tokio::time::sleep(self.delay) => {}
            }
        }
    }
}

/// Send one message; false once the client is gone
async fn emit(tx: &mpsc::Sender<Frame>, cancel: &CancellationToken, message: LiveMessage) -> bool {
    send_frame(tx, cancel, Frame::Message(message)).await
}

async fn send_frame(tx: &mpsc::Sender<Frame>, cancel: &CancellationToken, frame: Frame) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = tx.send(frame) => sent.is_ok(),
    }
}

/// Report the error to the client, then close with 1011
async fn fail(tx: &mpsc::Sender<Frame>, cancel: &CancellationToken, error: Error) -> SessionState {
    let reason = close_reason(&error.to_string());
    warn!("Live session failed: {}", error);

    if emit(tx, cancel, LiveMessage::error(error.to_string())).await {
        send_frame(
            tx,
            cancel,
            Frame::Close {
                code: CLOSE_INTERNAL_ERROR,
                reason: reason.clone(),
            },
        )
        .await;
    }

    SessionState::Closed(SessionEnd::Failed {
        code: CLOSE_INTERNAL_ERROR,
        reason,
    })
}

/// Truncate to the close-frame limit without splitting a character
pub fn close_reason(text: &str) -> String {
    if text.len() <= MAX_CLOSE_REASON_BYTES {
        return text.to_string();
    }
    let mut end = MAX_CLOSE_REASON_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
