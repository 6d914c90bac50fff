//! CallObserver port - Fan-out of call events to live monitors.
//!
//! Publishing is fire-and-forget. It must not block the turn and must not
//! fail when nobody is listening.

use crate::domain::dispatch::CallEvent;

/// Port for broadcasting call events
pub trait CallObserver: Send + Sync {
    /// Publish an event to every connected observer.
    fn publish(&self, event: CallEvent);

    /// Number of observers currently connected.
    fn observer_count(&self) -> usize;
}

/// Observer that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCallObserver;

impl CallObserver for NoopCallObserver {
    fn publish(&self, _event: CallEvent) {}

    fn observer_count(&self) -> usize {
        0
    }
}
