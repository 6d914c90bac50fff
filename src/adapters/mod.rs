//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the dispatch engine to external systems:
//! - `storage` - Conversation context stores (memory, YAML files, PostgreSQL)
//! - `monitor` - Live call monitoring over WebSocket
//! - `retell` - Retell voice-AI client and webhook verification
//! - `http` - axum routers for webhooks and call triggering

pub mod http;
pub mod monitor;
pub mod retell;
pub mod storage;

pub use monitor::ObserverRegistry;
pub use retell::{RetellClient, RetellConfig, RetellWebhookVerifier};
pub use storage::{FileContextStore, InMemoryContextStore, PostgresContextStore};
