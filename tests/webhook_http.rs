//! Integration tests for the Retell webhook endpoint.
//!
//! Drives whole calls through the HTTP layer with an in-memory store and
//! a live observer registry:
//! 1. Lifecycle events produce the replies the voice agent reads back
//! 2. Contexts are created, advanced and removed in the store
//! 3. Monitors see every webhook and every decision
//! 4. Signed deployments reject unsigned or forged requests

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use hmac::{Hmac, Mac};
use secrecy::SecretString;
use serde_json::{json, Value as JsonValue};
use sha2::Sha256;
use tokio::sync::broadcast;
use tower::ServiceExt;

use dispatch_checkin::adapters::http::{webhook_routes, WebhookHandlers};
use dispatch_checkin::adapters::monitor::ObserverRegistry;
use dispatch_checkin::adapters::retell::{RetellWebhookVerifier, SIGNATURE_HEADER};
use dispatch_checkin::adapters::storage::InMemoryContextStore;
use dispatch_checkin::application::{
    AnalyzeSpeechHandler, CallLocks, EndCallHandler, ProcessTurnHandler, StartCallHandler,
};
use dispatch_checkin::domain::dispatch::{CallEvent, ConversationState};
use dispatch_checkin::domain::foundation::CallId;
use dispatch_checkin::ports::{CallObserver, ContextStore};

const API_KEY: &str = "key_integration_test";

// =============================================================================
// Test Infrastructure
// =============================================================================

struct TestApp {
    store: Arc<InMemoryContextStore>,
    registry: Arc<ObserverRegistry>,
    handlers: WebhookHandlers,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(InMemoryContextStore::new());
        let registry = Arc::new(ObserverRegistry::default());
        let observer: Arc<dyn CallObserver> = registry.clone();
        let locks = Arc::new(CallLocks::new());

        let handlers = WebhookHandlers::new(
            Arc::new(StartCallHandler::new(store.clone(), observer.clone(), locks.clone())),
            Arc::new(ProcessTurnHandler::new(store.clone(), observer.clone(), locks.clone())),
            Arc::new(AnalyzeSpeechHandler::default()),
            Arc::new(EndCallHandler::new(store.clone(), observer.clone(), locks)),
            observer,
        );

        Self {
            store,
            registry,
            handlers,
        }
    }

    fn signed(mut self) -> Self {
        self.handlers = self
            .handlers
            .with_verifier(RetellWebhookVerifier::new(SecretString::new(API_KEY.to_string())));
        self
    }

    fn router(&self) -> Router {
        webhook_routes(self.handlers.clone())
    }

    async fn post(&self, body: JsonValue) -> (StatusCode, JsonValue) {
        self.send(body.to_string(), None).await
    }

    async fn send(&self, body: String, signature: Option<String>) -> (StatusCode, JsonValue) {
        let mut request = Request::builder()
            .method("POST")
            .uri("/retell")
            .header("content-type", "application/json");
        if let Some(signature) = signature {
            request = request.header(SIGNATURE_HEADER, signature);
        }

        let response = self
            .router()
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

fn signature_for(body: &str, timestamp_ms: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(API_KEY.as_bytes()).unwrap();
    mac.update(body.as_bytes());
    mac.update(timestamp_ms.to_string().as_bytes());
    let digest = mac.finalize().into_bytes();
    format!("v={},d={}", timestamp_ms, hex::encode(digest))
}

fn drain(receiver: &mut broadcast::Receiver<CallEvent>) -> Vec<&'static str> {
    let mut types = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        types.push(event.event_type());
    }
    types
}

fn metadata() -> JsonValue {
    json!({"driver_name": "Mike", "load_number": "LD-4471"})
}

fn turn(call_id: &str, utterance: &str) -> JsonValue {
    json!({
        "event": "agent_response_required",
        "call_id": call_id,
        "last_user_input": utterance,
        "metadata": metadata(),
    })
}

// =============================================================================
// Call lifecycle
// =============================================================================

#[tokio::test]
async fn cooperative_call_runs_start_to_finish() {
    let app = TestApp::new();
    let call_id = CallId::new("call_lifecycle_1").unwrap();

    let (status, body) = app
        .post(json!({
            "event": "call_started",
            "call_id": "call_lifecycle_1",
            "metadata": metadata(),
        }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["conversation_state"], "opening");
    assert!(body["response"].as_str().unwrap().contains("Mike"));

    let script = [
        ("Sure, give me a second", "gathering_status"),
        ("I'm driving, on my way now", "location_update"),
        ("Currently on I-35 near the exit", "eta_confirmation"),
        ("Should be there in about 40 minutes", "closing"),
    ];
    for (utterance, expected_state) in script {
        let (status, body) = app.post(turn("call_lifecycle_1", utterance)).await;
        assert_eq!(status, StatusCode::OK, "turn {:?}", utterance);
        assert_eq!(body["conversation_state"], expected_state, "turn {:?}", utterance);
        assert_eq!(body["emergency_check"], false);
    }

    let stored = app.store.load(&call_id).await.unwrap().unwrap();
    assert_eq!(stored.state, ConversationState::Closing);

    let (status, body) = app
        .post(json!({
            "event": "call_ended",
            "call": {
                "call_id": "call_lifecycle_1",
                "metadata": metadata(),
                "transcript": "Agent: Hi Mike...",
                "start_timestamp": 1_700_000_000_000_i64,
                "end_timestamp": 1_700_000_095_000_i64
            }
        }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["duration"], 95);
    assert_eq!(body["transcript"], "Agent: Hi Mike...");
    assert_eq!(body["outcome"]["disposition"], "completed");
    assert_eq!(body["outcome"]["information_gathered"]["timing_info"], "40 minutes");

    assert!(app.store.load(&call_id).await.unwrap().is_none());
}

#[tokio::test]
async fn emergency_turn_is_flagged_critical() {
    let app = TestApp::new();
    app.post(json!({"event": "call_started", "call_id": "call_emergency", "metadata": metadata()}))
        .await;
    app.post(turn("call_emergency", "Sure, give me a second")).await;

    let (status, body) = app
        .post(turn("call_emergency", "I had an accident, my truck hit a guardrail"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["conversation_state"], "emergency_protocol");
    assert_eq!(body["emergency_check"], true);
    assert_eq!(body["priority"], "CRITICAL");
    assert_eq!(body["emergency_type"], "accident");
}

#[tokio::test]
async fn turn_without_call_started_reinitializes() {
    let app = TestApp::new();

    let (status, body) = app.post(turn("call_late_join", "Sure, give me a second")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["conversation_state"], "gathering_status");

    let stored = app
        .store
        .load(&CallId::new("call_late_join").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.driver_name, "Mike");
}

#[tokio::test]
async fn call_ended_for_unknown_call_still_acknowledges() {
    let app = TestApp::new();

    let (status, body) = app
        .post(json!({"event": "call_ended", "call_id": "call_1234567890"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["driver_name"], "Web Test Driver");
    assert_eq!(body["load_number"], "WEB-call_123");
    assert!(body.get("outcome").is_none() || body["outcome"].is_null());
}

#[tokio::test]
async fn lifecycle_event_without_call_id_is_rejected() {
    let app = TestApp::new();
    let (status, _) = app.post(json!({"event": "call_started"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Side events
// =============================================================================

#[tokio::test]
async fn user_speech_reports_emergency() {
    let app = TestApp::new();
    let (status, body) = app
        .post(json!({
            "event": "user_speech",
            "call_id": "call_speech",
            "user_speech": "I'm having chest pain"
        }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["emergency_detected"], true);
    assert_eq!(body["emergency_type"], "medical");
}

#[tokio::test]
async fn user_speech_without_emergency_returns_analysis() {
    let app = TestApp::new();
    let (_, body) = app
        .post(json!({
            "event": "user_speech",
            "call_id": "call_speech",
            "user_speech": "Currently on I-35 near the exit"
        }))
        .await;
    assert_eq!(body["emergency_detected"], false);
    assert!(body["speech_analysis"].is_object());
    assert!(body["speech_analysis"]["cooperation_level"].is_string());
}

#[tokio::test]
async fn call_analyzed_echoes_analysis() {
    let app = TestApp::new();
    let (status, body) = app
        .post(json!({
            "event": "call_analyzed",
            "call": {
                "call_id": "call_analyzed_1",
                "call_analysis": {"call_summary": "Driver on schedule"}
            }
        }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["call_id"], "call_analyzed_1");
    assert_eq!(body["status"], "analysis_received");
    assert_eq!(body["analysis"]["call_summary"], "Driver on schedule");
}

#[tokio::test]
async fn unknown_event_is_acknowledged() {
    let app = TestApp::new();
    let (status, body) = app
        .post(json!({"event": "transfer_started", "call_id": "call_1"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success"}));
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = TestApp::new();
    let (status, _) = app.send("not json".to_string(), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Monitoring
// =============================================================================

#[tokio::test]
async fn monitors_see_webhooks_and_decisions() {
    let app = TestApp::new();
    let (_client, mut events) = app.registry.add().await;

    app.post(json!({"event": "call_started", "call_id": "call_watch", "metadata": metadata()}))
        .await;
    app.post(turn("call_watch", "I'm having chest pain")).await;

    let types = drain(&mut events);
    assert_eq!(
        types,
        vec![
            "call.webhook_received.v1",
            "call.started.v1",
            "call.webhook_received.v1",
            "call.emergency_detected.v1",
            "call.turn_decided.v1",
        ]
    );
}

// =============================================================================
// Signature verification
// =============================================================================

#[tokio::test]
async fn signed_deployment_accepts_valid_signature() {
    let app = TestApp::new().signed();
    let body = json!({"event": "call_started", "call_id": "call_signed", "metadata": metadata()})
        .to_string();
    let signature = signature_for(&body, chrono::Utc::now().timestamp_millis());

    let (status, body) = app.send(body, Some(signature)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["conversation_state"], "opening");
}

#[tokio::test]
async fn signed_deployment_rejects_missing_signature() {
    let app = TestApp::new().signed();
    let (status, _) = app.post(json!({"event": "call_started", "call_id": "call_1"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn signed_deployment_rejects_tampered_body() {
    let app = TestApp::new().signed();
    let signed_body = json!({"event": "call_started", "call_id": "call_1"}).to_string();
    let signature = signature_for(&signed_body, chrono::Utc::now().timestamp_millis());

    let tampered = json!({"event": "call_started", "call_id": "call_2"}).to_string();
    let (status, body) = app.send(tampered, Some(signature)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    assert!(app
        .store
        .load(&CallId::new("call_2").unwrap())
        .await
        .unwrap()
        .is_none());
}
