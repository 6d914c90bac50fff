//! State machine trait for lifecycle enums.
//!
//! Gives conversation states a single place to declare which transitions
//! exist, so the transition function and its tests agree on the graph.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors define valid state transitions and get validated
/// transition methods for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for ConversationState {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (Opening, GatheringStatus) | /* ... */)
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Opening => vec![GatheringStatus, EmergencyProtocol, Escalation],
///             // ...
///         }
///     }
/// }
///
/// let next = ConversationState::Opening.transition_to(ConversationState::GatheringStatus)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state has no outgoing transitions.
    fn has_no_exits(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
