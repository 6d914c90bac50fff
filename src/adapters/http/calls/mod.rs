//! HTTP adapter for outbound call endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{CallResponse, TriggerCallRequest};
pub use handlers::CallHandlers;
pub use routes::call_routes;
