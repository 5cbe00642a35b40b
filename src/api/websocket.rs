//! WebSocket support for real-time launchpad updates
//!
//! Provides a broadcast channel for pushing registry events to connected
//! clients, so indexers learn about new tokens without polling.

use crate::api::handlers::ApiState;
use crate::launchpad::EventRecord;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Maximum number of events to buffer per subscriber
const BROADCAST_CAPACITY: usize = 100;

/// WebSocket events that can be broadcast to clients
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsEvent {
    /// A registry event was appended to the log
    Launchpad { record: EventRecord },
    /// Connection established
    Connected { message: String, next_sequence: u64 },
    /// Heartbeat to keep connection alive
    Ping,
}

/// Broadcaster for WebSocket events
#[derive(Debug)]
pub struct WsBroadcaster {
    sender: broadcast::Sender<WsEvent>,
}

impl WsBroadcaster {
    /// Create a new broadcaster
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    /// Broadcast an event to all connected clients
    pub fn broadcast(&self, event: WsEvent) {
        // No subscribers is not an error
        let _ = self.sender.send(event);
    }

    /// Broadcast a batch of registry records, oldest first
    pub fn broadcast_records(&self, records: &[EventRecord]) {
        for record in records {
            self.broadcast(WsEvent::Launchpad {
                record: record.clone(),
            });
        }
    }

    /// Subscribe to events
    pub fn subscribe(&self) -> broadcast::Receiver<WsEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for WsBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<ApiState>) -> impl IntoResponse {
    let next_sequence = state.launchpad.read().await.events().len() as u64;
    let broadcaster = state.ws_broadcaster.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster, next_sequence))
}

/// Handle a WebSocket connection
async fn handle_socket(socket: WebSocket, broadcaster: Arc<WsBroadcaster>, next_sequence: u64) {
    let (mut sender, mut receiver) = socket.split();

    let mut rx = broadcaster.subscribe();

    // Clients use next_sequence to backfill via GET /api/events?since=
    let welcome = WsEvent::Connected {
        message: "Connected to launchpad event stream".to_string(),
        next_sequence,
    };
    if let Ok(json) = serde_json::to_string(&welcome) {
        let _ = sender.send(Message::Text(json.into())).await;
    }

    let mut send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if let Ok(json) = serde_json::to_string(&event) {
                        if sender.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("WebSocket client lagged, {} events skipped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(Message::Text(text)) => {
                    log::debug!("Ignoring client message: {}", text);
                }
                Err(e) => {
                    log::warn!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    log::info!("WebSocket connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launchpad::{EventLog, LaunchpadEvent};

    fn sample_record() -> EventRecord {
        let mut log = EventLog::new();
        log.push(LaunchpadEvent::Deposited {
            from: "alice".to_string(),
            amount: 42,
        })
    }

    #[test]
    fn test_broadcaster_creation() {
        let broadcaster = WsBroadcaster::new();
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[test]
    fn test_broadcast_with_no_subscribers() {
        let broadcaster = WsBroadcaster::new();
        broadcaster.broadcast(WsEvent::Ping);
    }

    #[tokio::test]
    async fn test_subscribers_receive_records_in_order() {
        let broadcaster = WsBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        let mut log = EventLog::new();
        log.push(LaunchpadEvent::Deposited {
            from: "alice".to_string(),
            amount: 1,
        });
        log.push(LaunchpadEvent::ReserveWithdrawn {
            owner: "owner".to_string(),
            amount: 1,
        });
        broadcaster.broadcast_records(log.all());

        for expected in 0..2u64 {
            match rx.recv().await.unwrap() {
                WsEvent::Launchpad { record } => assert_eq!(record.sequence, expected),
                other => panic!("unexpected event: {:?}", other),
            }
        }
    }

    #[test]
    fn test_event_serialization() {
        let event = WsEvent::Launchpad {
            record: sample_record(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Launchpad\""));
        assert!(json.contains("Deposited"));
        assert!(json.contains("alice"));
    }
}
