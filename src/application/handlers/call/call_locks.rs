//! Per-call turn serialization.
//!
//! Two webhooks for the same call must not load, decide and save
//! concurrently or one decision is lost. Handlers hold a `CallTurn` for
//! the whole load/decide/save sequence.
//!
//! An entry lives only while some task holds or waits on it. The last
//! `CallTurn` to drop prunes it, so the map never outgrows the calls in
//! flight and a waiter never ends up on a different mutex than a newcomer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::foundation::CallId;

type LockMap = HashMap<CallId, Arc<Mutex<()>>>;

/// One async mutex per call with a turn in flight.
#[derive(Debug, Default)]
pub struct CallLocks {
    locks: Arc<StdMutex<LockMap>>,
}

impl CallLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other turn for `call_id` is in flight.
    pub async fn acquire(&self, call_id: &CallId) -> CallTurn {
        let lock = lock_map(&self.locks)
            .entry(call_id.clone())
            .or_default()
            .clone();
        let guard = lock.lock_owned().await;
        CallTurn {
            call_id: call_id.clone(),
            guard: Some(guard),
            locks: self.locks.clone(),
        }
    }

    /// Calls with a turn running or waiting.
    pub fn active_calls(&self) -> usize {
        lock_map(&self.locks).len()
    }
}

/// Exclusive turn on one call. Dropping it lets the next turn run.
#[derive(Debug)]
pub struct CallTurn {
    call_id: CallId,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<StdMutex<LockMap>>,
}

impl Drop for CallTurn {
    fn drop(&mut self) {
        // Release the call's mutex before counting who still references it.
        self.guard.take();

        let mut locks = lock_map(&self.locks);
        let unused = locks
            .get(&self.call_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if unused {
            locks.remove(&self.call_id);
        }
    }
}

/// The map is only touched in short synchronous sections; a panic while
/// holding it cannot leave it half-updated.
fn lock_map(locks: &StdMutex<LockMap>) -> MutexGuard<'_, LockMap> {
    locks.lock().unwrap_or_else(PoisonError::into_inner)
}
