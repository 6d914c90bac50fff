//! State transition function.
//!
//! Applies one classified utterance to a context, in strict priority
//! order: emergency, noisy environment, retry escalation, then the
//! scenario table.

use super::classifier::{Classification, EmergencyType};
use super::context::{ConversationContext, InformationGathered};
use super::errors::EngineError;
use super::scenario::Scenario;
use super::state::ConversationState;
use crate::domain::foundation::StateMachine;

/// Resistant turns before the call is handed to a human.
pub const MAX_RETRIES: u32 = 3;

/// Unclear turns before the noisy-environment response is used.
pub const MAX_UNCLEAR_RESPONSES: u32 = 2;

/// Which rule decided the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// An emergency was reported; the call is in emergency protocol.
    Emergency(EmergencyType),
    /// Too many unclear turns; state unchanged.
    NoisyEnvironment,
    /// Retry budget exhausted.
    Escalated,
    /// The scenario table moved the call forward.
    Advanced {
        from: ConversationState,
        to: ConversationState,
    },
    /// The scenario table kept the call where it was.
    Held,
    /// The call was already in a terminal state; context untouched.
    Terminal,
}

/// Computes the next context for one turn.
///
/// # Errors
///
/// Returns `EngineError::InvalidTransition` if a rule asks for a move the
/// state graph does not allow. Given a valid context this cannot happen.
pub fn apply(
    mut context: ConversationContext,
    classification: &Classification,
    scenario: &Scenario,
) -> Result<(ConversationContext, TransitionOutcome), EngineError> {
    if let Some(kind) = classification.emergency {
        if context.state != ConversationState::EmergencyProtocol {
            context.state = move_to(context.state, ConversationState::EmergencyProtocol)?;
        }
        context.emergency_detected = true;
        context.emergency_type = Some(kind);
        return Ok((context, TransitionOutcome::Emergency(kind)));
    }

    if context.state.is_terminal() {
        return Ok((context, TransitionOutcome::Terminal));
    }

    if classification.unclear {
        context.unclear_responses = context.unclear_responses.saturating_add(1);
        if context.unclear_responses >= MAX_UNCLEAR_RESPONSES {
            return Ok((context, TransitionOutcome::NoisyEnvironment));
        }
    }

    context.cooperation_level = classification.cooperation;
    context
        .information_gathered
        .merge(&classification.extracted);

    if classification.cooperation.is_resistant() {
        context.retry_count = context.retry_count.saturating_add(1);
        if context.retry_count >= MAX_RETRIES {
            context.state = move_to(context.state, ConversationState::Escalation)?;
            return Ok((context, TransitionOutcome::Escalated));
        }
    }

    let from = context.state;
    let to = next_state(from, scenario, &classification.extracted);
    if to == from {
        return Ok((context, TransitionOutcome::Held));
    }
    context.state = move_to(from, to)?;
    Ok((context, TransitionOutcome::Advanced { from, to }))
}

/// Scenario table lookup. Only this turn's extraction counts.
pub fn next_state(
    current: ConversationState,
    scenario: &Scenario,
    extracted: &InformationGathered,
) -> ConversationState {
    use ConversationState::*;

    if *scenario != Scenario::DriverCheckin {
        return current;
    }

    match current {
        Opening => GatheringStatus,
        GatheringStatus => match extracted.driver_status {
            Some(status) if status.completes_checkin() => Closing,
            Some(_) => LocationUpdate,
            None => GatheringStatus,
        },
        LocationUpdate if extracted.location.is_some() => EtaConfirmation,
        EtaConfirmation if extracted.timing_info.is_some() => Closing,
        other => other,
    }
}

fn move_to(
    from: ConversationState,
    to: ConversationState,
) -> Result<ConversationState, EngineError> {
    from.transition_to(to)
        .map_err(|e| EngineError::InvalidTransition(e.to_string()))
}
