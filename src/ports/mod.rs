//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ContextStore` - Per-call conversation context persistence
//! - `CallObserver` - Fire-and-forget fan-out of call events to monitors
//! - `CallControl` - Outbound call placement through the voice-AI provider

mod call_control;
mod call_observer;
mod context_store;

pub use call_control::{
    CallControl, CallControlError, CallRecord, PhoneCallRequest, UnconfiguredCallControl,
    WebCallRequest,
};
pub use call_observer::{CallObserver, NoopCallObserver};
pub use context_store::{ContextStore, ContextStoreError};
