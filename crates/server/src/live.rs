// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live import progress over WebSocket.
//!
//! Every connected client receives session lifecycle events and one
//! progress event per committed batch. Events are informational; the
//! commit response remains the authoritative report.

use std::sync::Arc;

use axum::{
    extract::{
        State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use booth_map::{CommitProgress, CommitReport};
use futures::{SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Events buffered per client before the oldest are dropped.
const EVENT_BUFFER_SIZE: usize = 100;

/// Import events pushed to connected clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveEvent {
    /// A file was uploaded and a preview session opened.
    ImportOpened {
        /// The session id.
        session_id: String,
        /// The record kind slug.
        kind: String,
        /// Rows in the file.
        total: usize,
    },
    /// A batch finished committing.
    CommitProgress {
        /// The session id.
        session_id: String,
        /// The 1-based batch number.
        batch: usize,
        /// Total batches.
        batches: usize,
        /// Rows processed so far.
        processed: usize,
        /// Rows selected for commit.
        total: usize,
        /// Rows written so far.
        succeeded: usize,
        /// Rows failed so far.
        failed: usize,
    },
    /// A commit ended, completely or by cancellation.
    CommitFinished {
        /// The session id.
        session_id: String,
        /// Rows written.
        succeeded: usize,
        /// Rows failed or skipped.
        failed: usize,
        /// Rows selected for commit.
        total: usize,
        /// Whether the run was cancelled.
        cancelled: bool,
    },
    /// A session was abandoned.
    ImportClosed {
        /// The session id.
        session_id: String,
    },
    /// Connection confirmation (sent on initial connect).
    Connected {
        /// Server timestamp (ISO 8601).
        timestamp: String,
    },
}

impl LiveEvent {
    /// Builds the per-batch event for a session.
    #[must_use]
    pub fn progress(session_id: &str, progress: &CommitProgress) -> Self {
        Self::CommitProgress {
            session_id: session_id.to_string(),
            batch: progress.batch,
            batches: progress.batches,
            processed: progress.processed,
            total: progress.total,
            succeeded: progress.succeeded,
            failed: progress.failed,
        }
    }

    /// Builds the end-of-commit event for a session.
    #[must_use]
    pub fn finished(session_id: &str, report: &CommitReport) -> Self {
        Self::CommitFinished {
            session_id: session_id.to_string(),
            succeeded: report.succeeded,
            failed: report.failed.len(),
            total: report.total,
            cancelled: report.cancelled,
        }
    }
}

/// Fan-out of live events to every WebSocket client.
#[derive(Debug, Clone)]
pub struct LiveEventBroadcaster {
    tx: broadcast::Sender<LiveEvent>,
}

impl LiveEventBroadcaster {
    /// Creates a broadcaster with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Sends an event to all connected clients, dropping it when none are
    /// connected.
    pub fn broadcast(&self, event: &LiveEvent) {
        match self.tx.send(event.clone()) {
            Ok(count) => debug!(?event, receivers = count, "Broadcast live event"),
            Err(_) => debug!(?event, "No receivers for live event"),
        }
    }

    /// Returns a receiver for events sent from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LiveEvent> {
        self.tx.subscribe()
    }
}

impl Default for LiveEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Handler for GET `/imports/events`.
///
/// # Arguments
///
/// * `ws` - WebSocket upgrade request
/// * `broadcaster` - The live event broadcaster from application state
pub async fn live_events_handler(
    ws: WebSocketUpgrade,
    AxumState(broadcaster): AxumState<Arc<LiveEventBroadcaster>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster))
}

async fn handle_socket(socket: WebSocket, broadcaster: Arc<LiveEventBroadcaster>) {
    info!("Client connected to import event stream");

    let (mut sender, mut receiver) = socket.split();
    let mut rx: broadcast::Receiver<LiveEvent> = broadcaster.subscribe();

    let connected: LiveEvent = LiveEvent::Connected {
        timestamp: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| String::from("unknown")),
    };

    if let Ok(json) = serde_json::to_string(&connected)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        warn!("Failed to send connection confirmation");
        return;
    }

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(json) => {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => error!(?e, "Failed to serialize live event"),
                },
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Live event client lagging, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Clients only listen; anything they send is ignored.
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!("Client disconnected from import event stream");
}
