//! Call events broadcast to live monitors.
//!
//! Events are records of what already happened; observers cannot affect
//! the call. Each carries its own id and timestamp so monitors can
//! de-duplicate and order them.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::classifier::EmergencyType;
use super::context::ConversationContext;
use super::outcome::CallOutcome;
use super::response::TurnDecision;
use crate::domain::foundation::{CallId, EventId, Timestamp};

/// What happened on the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallEventKind {
    /// Raw inbound webhook, published before any processing.
    WebhookReceived { event: String, payload: JsonValue },

    CallStarted {
        driver_name: String,
        load_number: String,
        scenario: String,
        greeting: TurnDecision,
    },

    TurnDecided {
        utterance: String,
        decision: TurnDecision,
        context: ConversationContext,
    },

    EmergencyDetected {
        emergency_type: EmergencyType,
        driver_name: String,
        load_number: String,
        utterance: String,
    },

    CallEnded { outcome: CallOutcome },
}

impl CallEventKind {
    /// Versioned routing name, e.g. `call.turn_decided.v1`.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::WebhookReceived { .. } => "call.webhook_received.v1",
            Self::CallStarted { .. } => "call.started.v1",
            Self::TurnDecided { .. } => "call.turn_decided.v1",
            Self::EmergencyDetected { .. } => "call.emergency_detected.v1",
            Self::CallEnded { .. } => "call.ended.v1",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEvent {
    pub event_id: EventId,
    pub call_id: CallId,
    pub occurred_at: Timestamp,
    #[serde(flatten)]
    pub kind: CallEventKind,
}

impl CallEvent {
    pub fn new(call_id: CallId, kind: CallEventKind) -> Self {
        Self {
            event_id: EventId::new(),
            call_id,
            occurred_at: Timestamp::now(),
            kind,
        }
    }

    pub fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    pub fn webhook_received(call_id: CallId, event: impl Into<String>, payload: JsonValue) -> Self {
        Self::new(
            call_id,
            CallEventKind::WebhookReceived {
                event: event.into(),
                payload,
            },
        )
    }

    pub fn turn_decided(
        call_id: CallId,
        utterance: impl Into<String>,
        decision: TurnDecision,
        context: ConversationContext,
    ) -> Self {
        Self::new(
            call_id,
            CallEventKind::TurnDecided {
                utterance: utterance.into(),
                decision,
                context,
            },
        )
    }
}
