//! Live call monitoring.
//!
//! `ObserverRegistry` implements the `CallObserver` port; the WebSocket
//! endpoint streams everything published to it.

mod handler;
mod messages;
mod registry;

pub use handler::{monitor_routes, monitor_status, ws_handler};
pub use messages::{ClientMessage, MonitorStatus, ServerMessage};
pub use registry::{ObserverRegistry, DEFAULT_CHANNEL_CAPACITY};
