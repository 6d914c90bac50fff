//! EndCallHandler - Closes out a call and produces its outcome.

use std::sync::Arc;

use crate::domain::dispatch::{CallEvent, CallEventKind, CallOutcome};
use crate::domain::foundation::CallId;
use crate::ports::{CallObserver, ContextStore};

use super::call_locks::CallLocks;
use super::errors::CallError;

/// Command issued for a `call_ended` webhook.
#[derive(Debug, Clone)]
pub struct EndCallCommand {
    pub call_id: CallId,
}

#[derive(Debug, Clone)]
pub struct EndCallResult {
    pub outcome: CallOutcome,
}

/// Handler for call completion.
pub struct EndCallHandler {
    store: Arc<dyn ContextStore>,
    observer: Arc<dyn CallObserver>,
    locks: Arc<CallLocks>,
}

impl EndCallHandler {
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

    pub async fn handle(&self, cmd: EndCallCommand) -> Result<EndCallResult, CallError> {
        let outcome = {
            let _turn = self.locks.acquire(&cmd.call_id).await;

            let context = self
                .store
                .load(&cmd.call_id)
                .await?
                .ok_or_else(|| CallError::NotFound(cmd.call_id.clone()))?;

            let outcome = CallOutcome::from_context(cmd.call_id.clone(), &context);
            self.store.delete(&cmd.call_id).await?;
            outcome
        };

        tracing::info!(
            call_id = %cmd.call_id,
            final_state = %outcome.final_state,
            disposition = ?outcome.disposition,
            "Call ended"
        );

        self.observer.publish(CallEvent::new(
            cmd.call_id,
            CallEventKind::CallEnded {
                outcome: outcome.clone(),
            },
        ));

        Ok(EndCallResult { outcome })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryContextStore;
    use crate::domain::dispatch::{
        ConversationContext, ConversationState, Disposition, DriverStatus, EmergencyType,
    };
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<CallEvent>>,
    }

    impl CallObserver for RecordingObserver {
        fn publish(&self, event: CallEvent) {
            self.events.lock().unwrap().push(event);
        }

        fn observer_count(&self) -> usize {
            1
        }
    }

    fn call_id() -> CallId {
        CallId::new("call_end_1").unwrap()
    }

    struct Fixture {
        store: Arc<InMemoryContextStore>,
        observer: Arc<RecordingObserver>,
        locks: Arc<CallLocks>,
        handler: EndCallHandler,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryContextStore::new());
        let observer = Arc::new(RecordingObserver::default());
        let locks = Arc::new(CallLocks::new());
        let handler = EndCallHandler::new(store.clone(), observer.clone(), locks.clone());
        Fixture {
            store,
            observer,
            locks,
            handler,
        }
    }

    #[tokio::test]
    async fn completed_call_outcome() {
        let f = fixture();
        let mut ctx = ConversationContext::new("Mike", "LD-4471").unwrap();
        ctx.state = ConversationState::Closing;
        ctx.information_gathered.driver_status = Some(DriverStatus::Arrived);
        f.store.save(&call_id(), &ctx).await.unwrap();

        let result = f
            .handler
            .handle(EndCallCommand { call_id: call_id() })
            .await
            .unwrap();

        assert_eq!(result.outcome.disposition, Disposition::Completed);
        assert_eq!(
            result.outcome.information_gathered.driver_status,
            Some(DriverStatus::Arrived)
        );
    }

    #[tokio::test]
    async fn deletes_context_and_lock() {
        let f = fixture();
        let ctx = ConversationContext::new("Mike", "LD-4471").unwrap();
        f.store.save(&call_id(), &ctx).await.unwrap();

        f.handler
            .handle(EndCallCommand { call_id: call_id() })
            .await
            .unwrap();

        assert!(f.store.load(&call_id()).await.unwrap().is_none());
        assert_eq!(f.locks.active_calls(), 0);
    }

    #[tokio::test]
    async fn publishes_call_ended_with_emergency() {
        let f = fixture();
        let mut ctx = ConversationContext::new("Mike", "LD-4471").unwrap();
        ctx.state = ConversationState::EmergencyProtocol;
        ctx.emergency_detected = true;
        ctx.emergency_type = Some(EmergencyType::Medical);
        f.store.save(&call_id(), &ctx).await.unwrap();

        let result = f
            .handler
            .handle(EndCallCommand { call_id: call_id() })
            .await
            .unwrap();
        assert_eq!(result.outcome.disposition, Disposition::Emergency);
        assert!(result.outcome.needs_follow_up());

        let events = f.observer.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "call.ended.v1");
    }

    #[tokio::test]
    async fn unknown_call_is_not_found() {
        let f = fixture();
        let err = f
            .handler
            .handle(EndCallCommand { call_id: call_id() })
            .await
            .unwrap_err();

        assert!(matches!(err, CallError::NotFound(id) if id == call_id()));
        assert!(f.observer.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_calls_leave_no_lock_entries() {
        let f = fixture();
        for n in 0..100 {
            let call_id = CallId::new(format!("call_unknown_{n}")).unwrap();
            let result = f.handler.handle(EndCallCommand { call_id }).await;
            assert!(matches!(result, Err(CallError::NotFound(_))));
        }
        assert_eq!(f.locks.active_calls(), 0);
    }
}
