//! Cancellable trailing-edge timer.
//!
//! At most one action is outstanding: every rearm aborts the previous task.
//! Each arm also gets a generation number, and the fired action must
//! [`claim`](DebounceTimer::claim) it under the owner's lock before acting,
//! so an action that lost a race with a rearm becomes a no-op.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub struct DebounceTimer {
    pending: Option<JoinHandle<()>>,
    generation: u64,
}

impl DebounceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending action and schedule a new one after `delay`.
    ///
    /// `action` receives the generation of this arm. Returns that generation.
    pub fn rearm<F, Fut>(&mut self, delay: Duration, action: F) -> u64
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let fired = action(generation);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fired.await;
        }));
        generation
    }

    /// Abort the pending action, if any. Returns whether one was pending.
    ///
    /// Must not be called from the fired action itself; use [`claim`](Self::claim).
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Disarm the timer on behalf of the fired action for `generation`.
    ///
    /// Returns `false` if the timer was rearmed or cancelled since.
    pub fn claim(&mut self, generation: u64) -> bool {
        if self.pending.is_some() && self.generation == generation {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
