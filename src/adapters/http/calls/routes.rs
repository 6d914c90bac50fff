//! HTTP routes for call endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_call, trigger_call, CallHandlers};

/// Creates the call router.
pub fn call_routes(handlers: CallHandlers) -> Router {
    Router::new()
        .route("/", post(trigger_call))
        .route("/:id", get(get_call))
        .with_state(handlers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{GetCallHandler, TriggerCallHandler};
    use crate::domain::dispatch::Scenario;
    use crate::ports::{
        CallControl, CallControlError, CallRecord, PhoneCallRequest, WebCallRequest,
    };
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct StubCallControl;

    fn record(call_id: &str) -> CallRecord {
        CallRecord {
            call_id: call_id.to_string(),
            agent_id: Some("agent_1".to_string()),
            call_status: Some("registered".to_string()),
            access_token: None,
            metadata: HashMap::new(),
        }
    }

    #[async_trait]
    impl CallControl for StubCallControl {
        async fn create_phone_call(&self, _: PhoneCallRequest) -> Result<CallRecord, CallControlError> {
            Ok(record("call_phone"))
        }

        async fn create_web_call(&self, _: WebCallRequest) -> Result<CallRecord, CallControlError> {
            Ok(CallRecord {
                access_token: Some("tok".to_string()),
                ..record("call_web")
            })
        }

        async fn get_call(&self, call_id: &str) -> Result<CallRecord, CallControlError> {
            if call_id == "call_known" {
                Ok(record(call_id))
            } else {
                Err(CallControlError::NotFound(call_id.to_string()))
            }
        }
    }

    fn router(default_agent: Option<&str>) -> Router {
        let control: Arc<dyn CallControl> = Arc::new(StubCallControl);
        call_routes(CallHandlers::new(
            Arc::new(TriggerCallHandler::new(
                control.clone(),
                default_agent.map(str::to_string),
            )),
            Arc::new(GetCallHandler::new(control)),
            Scenario::DriverCheckin,
        ))
    }

    fn post_json(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn phone_call_returns_created() {
        let response = router(Some("agent_1"))
            .oneshot(post_json(serde_json::json!({
                "driver_name": "Mike",
                "load_number": "LD-4471",
                "phone_number": "+15550001111"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_body(response).await;
        assert_eq!(json["call_id"], "call_phone");
        assert_eq!(json["call_type"], "phone");
    }

    #[tokio::test]
    async fn web_call_without_number() {
        let response = router(Some("agent_1"))
            .oneshot(post_json(serde_json::json!({
                "driver_name": "Mike",
                "load_number": "LD-4471"
            })))
            .await
            .unwrap();

        let json = json_body(response).await;
        assert_eq!(json["call_type"], "web");
        assert_eq!(json["access_token"], "tok");
    }

    #[tokio::test]
    async fn blank_driver_is_bad_request() {
        let response = router(Some("agent_1"))
            .oneshot(post_json(serde_json::json!({
                "driver_name": "",
                "load_number": "LD-4471"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn missing_agent_is_unavailable() {
        let response = router(None)
            .oneshot(post_json(serde_json::json!({
                "driver_name": "Mike",
                "load_number": "LD-4471"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn get_unknown_call_is_not_found() {
        let response = router(None)
            .oneshot(
                Request::builder()
                    .uri("/call_missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_known_call() {
        let response = router(None)
            .oneshot(Request::builder().uri("/call_known").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["call_status"], "registered");
    }
}
