//! StartCallHandler - Opens the conversation when a call connects.

use std::sync::Arc;

use crate::domain::dispatch::{
    CallEvent, CallEventKind, ConversationContext, DispatchEngine, Scenario, TurnDecision,
};
use crate::domain::foundation::CallId;
use crate::ports::{CallObserver, ContextStore};

use super::call_locks::CallLocks;
use super::errors::CallError;

/// Command issued for a `call_started` webhook.
#[derive(Debug, Clone)]
pub struct StartCallCommand {
    pub call_id: CallId,
    pub driver_name: String,
    pub load_number: String,
    pub scenario: Scenario,
}

/// Result of starting a call.
#[derive(Debug, Clone)]
pub struct StartCallResult {
    pub context: ConversationContext,
    pub greeting: TurnDecision,
    /// False when the call already had a stored context (webhook redelivery).
    pub created: bool,
}

/// Handler for call start.
pub struct StartCallHandler {
    store: Arc<dyn ContextStore>,
    observer: Arc<dyn CallObserver>,
    locks: Arc<CallLocks>,
}

impl StartCallHandler {
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

    pub async fn handle(&self, cmd: StartCallCommand) -> Result<StartCallResult, CallError> {
        let _turn = self.locks.acquire(&cmd.call_id).await;
        let engine = DispatchEngine::new(cmd.scenario.clone());

        if let Some(context) = self.store.load(&cmd.call_id).await? {
            tracing::debug!(call_id = %cmd.call_id, state = %context.state, "Call already started");
            let greeting = engine.greet(&context);
            return Ok(StartCallResult {
                context,
                greeting,
                created: false,
            });
        }

        let context = engine.initial_context(&cmd.driver_name, &cmd.load_number)?;
        let greeting = engine.greet(&context);
        self.store.save(&cmd.call_id, &context).await?;

        tracing::info!(
            call_id = %cmd.call_id,
            load_number = %context.load_number,
            scenario = %cmd.scenario,
            "Call started"
        );

        self.observer.publish(CallEvent::new(
            cmd.call_id,
            CallEventKind::CallStarted {
                driver_name: context.driver_name.clone(),
                load_number: context.load_number.clone(),
                scenario: cmd.scenario.to_string(),
                greeting: greeting.clone(),
            },
        ));

        Ok(StartCallResult {
            context,
            greeting,
            created: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::InMemoryContextStore;
    use crate::domain::dispatch::{ConversationState, ResponseTemplate};
    use crate::ports::ContextStoreError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingObserver {
        events: Mutex<Vec<CallEvent>>,
    }

    impl RecordingObserver {
        fn new() -> Self {
            Self {
                events: Mutex::new(Vec::new()),
            }
        }

        fn events(&self) -> Vec<CallEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl CallObserver for RecordingObserver {
        fn publish(&self, event: CallEvent) {
            self.events.lock().unwrap().push(event);
        }

        fn observer_count(&self) -> usize {
            1
        }
    }

    struct FailingStore;

    #[async_trait]
    impl ContextStore for FailingStore {
        async fn load(&self, _: &CallId) -> Result<Option<ConversationContext>, ContextStoreError> {
            Ok(None)
        }

        async fn save(&self, _: &CallId, _: &ConversationContext) -> Result<(), ContextStoreError> {
            Err(ContextStoreError::IoError("Simulated save failure".to_string()))
        }

        async fn delete(&self, _: &CallId) -> Result<bool, ContextStoreError> {
            Ok(false)
        }
    }

    fn command(driver_name: &str) -> StartCallCommand {
        StartCallCommand {
            call_id: CallId::new("call_start_1").unwrap(),
            driver_name: driver_name.to_string(),
            load_number: "LD-4471".to_string(),
            scenario: Scenario::DriverCheckin,
        }
    }

    fn handler(
        store: Arc<dyn ContextStore>,
        observer: Arc<RecordingObserver>,
    ) -> StartCallHandler {
        StartCallHandler::new(store, observer, Arc::new(CallLocks::new()))
    }

    #[tokio::test]
    async fn saves_opening_context_and_greets() {
        let store = Arc::new(InMemoryContextStore::new());
        let observer = Arc::new(RecordingObserver::new());

        let result = handler(store.clone(), observer.clone())
            .handle(command("Mike"))
            .await
            .unwrap();

        assert!(result.created);
        assert_eq!(result.context.state, ConversationState::Opening);
        assert_eq!(result.greeting.template, ResponseTemplate::Opening);
        assert!(result.greeting.message.contains("Mike"));

        let stored = store
            .load(&CallId::new("call_start_1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored, result.context);
    }

    #[tokio::test]
    async fn publishes_call_started() {
        let observer = Arc::new(RecordingObserver::new());
        handler(Arc::new(InMemoryContextStore::new()), observer.clone())
            .handle(command("Mike"))
            .await
            .unwrap();

        let events = observer.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "call.started.v1");
    }

    #[tokio::test]
    async fn redelivery_keeps_existing_context() {
        let store = Arc::new(InMemoryContextStore::new());
        let observer = Arc::new(RecordingObserver::new());
        let handler = handler(store.clone(), observer.clone());

        let mut progressed = ConversationContext::new("Mike", "LD-4471").unwrap();
        progressed.state = ConversationState::LocationUpdate;
        store
            .save(&CallId::new("call_start_1").unwrap(), &progressed)
            .await
            .unwrap();

        let result = handler.handle(command("Mike")).await.unwrap();
        assert!(!result.created);
        assert_eq!(result.context.state, ConversationState::LocationUpdate);
        assert!(observer.events().is_empty());
    }

    #[tokio::test]
    async fn blank_driver_name_is_rejected() {
        let observer = Arc::new(RecordingObserver::new());
        let err = handler(Arc::new(InMemoryContextStore::new()), observer.clone())
            .handle(command("   "))
            .await
            .unwrap_err();

        assert!(err.is_client_error());
        assert!(observer.events().is_empty());
    }

    #[tokio::test]
    async fn save_failure_is_returned_and_nothing_published() {
        let observer = Arc::new(RecordingObserver::new());
        let err = handler(Arc::new(FailingStore), observer.clone())
            .handle(command("Mike"))
            .await
            .unwrap_err();

        assert!(matches!(err, CallError::Store(_)));
        assert!(observer.events().is_empty());
    }
}
