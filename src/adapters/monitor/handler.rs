//! WebSocket and status endpoints for live call monitoring.
//!
//! Connection lifecycle:
//! 1. Upgrade to WebSocket
//! 2. Register with the observer registry
//! 3. Forward every call event until either side goes away
//! 4. Unregister

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Json, Router,
};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::domain::foundation::Timestamp;

use super::messages::{ClientMessage, MonitorStatus, ServerMessage};
use super::registry::ObserverRegistry;

/// GET /api/monitor/conversation - Stream call events
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(registry): State<Arc<ObserverRegistry>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, registry))
}

/// GET /api/monitor/status - Connected monitor count
pub async fn monitor_status(State(registry): State<Arc<ObserverRegistry>>) -> Json<MonitorStatus> {
    Json(MonitorStatus {
        active_connections: registry.client_count().await,
        status: "running".to_string(),
    })
}

async fn handle_socket(socket: WebSocket, registry: Arc<ObserverRegistry>) {
    let (mut sender, mut receiver) = socket.split();
    let (client_id, mut events) = registry.add().await;

    let connected = ServerMessage::Connected {
        client_id: client_id.to_string(),
        timestamp: Timestamp::now().to_rfc3339(),
    };
    if let Err(e) = send_message(&mut sender, &connected).await {
        tracing::debug!(client_id = %client_id, "Failed to send connected message: {}", e);
        registry.remove(&client_id).await;
        return;
    }

    // Pongs go through the same sink as events
    let (pong_tx, mut pong_rx) = tokio::sync::mpsc::channel::<ServerMessage>(8);

    let mut send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                received = events.recv() => match received {
                    Ok(event) => ServerMessage::webhook_event(event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(client_id = %client_id, skipped, "Monitor lagging, events dropped");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                },
                Some(pong) = pong_rx.recv() => pong,
            };
            if let Err(e) = send_message(&mut sender, &msg).await {
                tracing::debug!(client_id = %client_id, "Send error, closing connection: {}", e);
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    if let Ok(ClientMessage::Ping) = serde_json::from_str::<ClientMessage>(&text) {
                        if pong_tx.send(ServerMessage::pong()).await.is_err() {
                            break;
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(client_id = %client_id, "Client sent close frame");
                    break;
                }
                // Protocol ping/pong is handled by axum; binary is ignored
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(client_id = %client_id, "Receive error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    registry.remove(&client_id).await;
}

async fn send_message(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    sender.send(Message::Text(json)).await
}

/// Creates the monitor router.
///
/// Mounted under `/api/monitor`.
pub fn monitor_routes(registry: Arc<ObserverRegistry>) -> Router {
    Router::new()
        .route("/conversation", get(ws_handler))
        .route("/status", get(monitor_status))
        .with_state(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn status_reports_connected_clients() {
        let registry = Arc::new(ObserverRegistry::default());
        let (_client, _rx) = registry.add().await;
        let app = monitor_routes(registry);

        let response = app
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let status: MonitorStatus = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            status,
            MonitorStatus {
                active_connections: 1,
                status: "running".to_string()
            }
        );
    }

    #[tokio::test]
    async fn conversation_requires_websocket_upgrade() {
        let app = monitor_routes(Arc::new(ObserverRegistry::default()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/conversation")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
}
