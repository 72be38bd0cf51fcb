//! Reentrancy Guard
//!
//! Every balance-mutating entry point runs inside a [`CallScope`]. Calls from
//! other threads wait for the scope to close, which serializes execution;
//! a call re-entering from inside a collaborator on the same thread is
//! rejected with [`EngineError::ReentrantCall`].

use std::cell::Cell;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use tracing::warn;

use synthusd_common::errors::{EngineError, EngineResult};

/// Serializes mutating calls and detects re-entry
#[derive(Debug, Default)]
pub struct CallSequencer {
    in_call: ReentrantMutex<Cell<bool>>,
}

/// Held for the duration of one mutating call
pub struct CallScope<'a> {
    guard: ReentrantMutexGuard<'a, Cell<bool>>,
}

impl CallSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a call scope, waiting for any other thread's call to finish
    pub fn enter(&self) -> EngineResult<CallScope<'_>> {
        let guard = self.in_call.lock();
        if guard.get() {
            warn!("Reentrant call rejected");
            return Err(EngineError::ReentrantCall);
        }
        guard.set(true);
        Ok(CallScope { guard })
    }
}

impl Drop for CallScope<'_> {
    fn drop(&mut self) {
        self.guard.set(false);
    }
}
