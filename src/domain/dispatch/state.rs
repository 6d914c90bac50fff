//! Conversation state machine.
//!
//! Defines the stages of a dispatch check-in call and which moves between
//! them the engine may make.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// The stage of a check-in conversation.
///
/// Calls start in `Opening` and move forward as the driver supplies
/// status, location and timing:
/// - `Opening`: greeting sent, nothing heard yet
/// - `GatheringStatus`: waiting for arrived/driving/delayed/unloading
/// - `LocationUpdate`: status known, waiting for a location
/// - `EtaConfirmation`: location known, waiting for timing
/// - `IssueResolution`: reserved for issue follow-up, no scenario rules
/// - `EmergencyProtocol`: an emergency was reported; sticky
/// - `Closing`: check-in complete
/// - `Escalation`: handed to a human dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Opening,
    GatheringStatus,
    LocationUpdate,
    EtaConfirmation,
    IssueResolution,
    EmergencyProtocol,
    Closing,
    Escalation,
}

impl ConversationState {
    /// All states, in declaration order.
    pub const ALL: [ConversationState; 8] = [
        Self::Opening,
        Self::GatheringStatus,
        Self::LocationUpdate,
        Self::EtaConfirmation,
        Self::IssueResolution,
        Self::EmergencyProtocol,
        Self::Closing,
        Self::Escalation,
    ];

    /// Returns true once no scenario-driven transition can leave the state.
    ///
    /// Only emergency pre-emption moves a call out of `Closing` or
    /// `Escalation`; nothing moves it out of `EmergencyProtocol`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Closing | Self::Escalation | Self::EmergencyProtocol
        )
    }

    /// Snake-case name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::GatheringStatus => "gathering_status",
            Self::LocationUpdate => "location_update",
            Self::EtaConfirmation => "eta_confirmation",
            Self::IssueResolution => "issue_resolution",
            Self::EmergencyProtocol => "emergency_protocol",
            Self::Closing => "closing",
            Self::Escalation => "escalation",
        }
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for ConversationState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConversationState::*;
        matches!(
            (self, target),
            // Emergency pre-empts every stage except itself
            (Opening | GatheringStatus | LocationUpdate | EtaConfirmation
                | IssueResolution | Closing | Escalation, EmergencyProtocol) |
            // Retry exhaustion hands off from any active stage
            (Opening | GatheringStatus | LocationUpdate | EtaConfirmation
                | IssueResolution, Escalation) |
            // driver_checkin flow
            (Opening, GatheringStatus) |
            (GatheringStatus, LocationUpdate) |
            (GatheringStatus, Closing) |
            (LocationUpdate, EtaConfirmation) |
            (EtaConfirmation, Closing)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationState::*;
        match self {
            Opening => vec![GatheringStatus, EmergencyProtocol, Escalation],
            GatheringStatus => vec![LocationUpdate, Closing, EmergencyProtocol, Escalation],
            LocationUpdate => vec![EtaConfirmation, EmergencyProtocol, Escalation],
            EtaConfirmation => vec![Closing, EmergencyProtocol, Escalation],
            IssueResolution => vec![EmergencyProtocol, Escalation],
            Closing => vec![EmergencyProtocol],
            Escalation => vec![EmergencyProtocol],
            EmergencyProtocol => vec![],
        }
    }
}
