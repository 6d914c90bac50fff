//! WebSocket message types for live call monitoring.
//!
//! - Server → Client: connection status, call events, pong
//! - Client → Server: ping

use serde::{Deserialize, Serialize};

use crate::domain::dispatch::CallEvent;
use crate::domain::foundation::Timestamp;

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established.
    Connected { client_id: String, timestamp: String },

    /// A call event, as published by the webhook handlers.
    WebhookEvent { timestamp: String, data: CallEvent },

    /// Heartbeat response.
    Pong { timestamp: String },
}

impl ServerMessage {
    pub fn webhook_event(event: CallEvent) -> Self {
        Self::WebhookEvent {
            timestamp: Timestamp::now().to_rfc3339(),
            data: event,
        }
    }

    pub fn pong() -> Self {
        Self::Pong {
            timestamp: Timestamp::now().to_rfc3339(),
        }
    }
}

/// All message types that can be received from client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping,
}

/// Body of `GET /api/monitor/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorStatus {
    pub active_connections: usize,
    pub status: String,
}
