//! ProcessTurnHandler - Runs one conversation turn for a call.
//!
//! Load, decide, save, then publish. The save completes before the
//! decision is returned so the next webhook for the call sees it.

use std::sync::Arc;

use crate::domain::dispatch::{
    CallEvent, CallEventKind, ConversationContext, DispatchEngine, Scenario, TurnDecision,
};
use crate::domain::foundation::CallId;
use crate::ports::{CallObserver, ContextStore};

use super::call_locks::CallLocks;
use super::errors::CallError;

/// Command issued for an `agent_response_required` webhook.
#[derive(Debug, Clone)]
pub struct ProcessTurnCommand {
    pub call_id: CallId,
    pub utterance: String,
    /// Used only when no context is stored for the call.
    pub driver_name: String,
    /// Used only when no context is stored for the call.
    pub load_number: String,
    pub scenario: Scenario,
}

#[derive(Debug, Clone)]
pub struct ProcessTurnResult {
    pub context: ConversationContext,
    pub decision: TurnDecision,
    /// True when no stored context was found and the call restarted
    /// from the opening.
    pub reinitialized: bool,
}

/// Handler for conversation turns.
pub struct ProcessTurnHandler {
    store: Arc<dyn ContextStore>,
    observer: Arc<dyn CallObserver>,
    locks: Arc<CallLocks>,
}

impl ProcessTurnHandler {
    pub fn new(
        store: Arc<dyn ContextStore>,
        observer: Arc<dyn CallObserver>,
        locks: Arc<CallLocks>,
    ) -> Self {
        Self {
            store,
            observer,
            locks,
        }
    }

    pub async fn handle(&self, cmd: ProcessTurnCommand) -> Result<ProcessTurnResult, CallError> {
        let _turn = self.locks.acquire(&cmd.call_id).await;
        let engine = DispatchEngine::new(cmd.scenario.clone());

        let (context, reinitialized) = match self.store.load(&cmd.call_id).await? {
            Some(context) => (context, false),
            None => {
                tracing::warn!(
                    call_id = %cmd.call_id,
                    "No stored context for call, starting from opening"
                );
                (engine.initial_context(&cmd.driver_name, &cmd.load_number)?, true)
            }
        };

        let (context, decision) = engine.decide(context, &cmd.utterance)?;
        self.store.save(&cmd.call_id, &context).await?;

        tracing::info!(
            call_id = %cmd.call_id,
            state = %decision.state,
            priority = %decision.priority,
            "Turn processed"
        );

        if let Some(emergency_type) = decision.emergency_type.filter(|_| decision.is_critical()) {
            self.observer.publish(CallEvent::new(
                cmd.call_id.clone(),
                CallEventKind::EmergencyDetected {
                    emergency_type,
                    driver_name: context.driver_name.clone(),
                    load_number: context.load_number.clone(),
                    utterance: cmd.utterance.clone(),
                },
            ));
        }
        self.observer.publish(CallEvent::turn_decided(
            cmd.call_id,
            cmd.utterance,
            decision.clone(),
            context.clone(),
        ));

        Ok(ProcessTurnResult {
            context,
            decision,
            reinitialized,
        })
    }
}
