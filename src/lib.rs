//! Dispatch Check-in - Voice conversation engine for driver check-in calls
//!
//! A dispatcher's voice agent calls a truck driver about a load. Each
//! webhook from the voice provider becomes one turn: classify what the
//! driver said, move the conversation state machine, and return the next
//! line for the agent to speak. Emergencies pre-empt everything.
//!
//! Layout follows hexagonal architecture:
//! - `domain` - Pure conversation logic, no I/O
//! - `ports` - Traits for storage, monitoring and call control
//! - `application` - Command handlers that drive a call through its lifecycle
//! - `adapters` - HTTP, WebSocket, Retell and storage implementations
//! - `config` - Environment-driven configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
