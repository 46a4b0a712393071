//! Test timer: a `Timer` that never waits on the wall clock.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use cashflow_core::time::Timer;

/// Records every requested sleep and yields to the scheduler instead of
/// waiting, so spawned tasks (card resolution, token movement) still make
/// progress between polls.
#[derive(Debug, Default)]
pub struct InstantTimer {
    sleeps: Mutex<Vec<Duration>>,
}

impl InstantTimer {
    /// Creates a timer with an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all requested sleeps, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }

    /// Number of sleeps of exactly `duration`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn count_of(&self, duration: Duration) -> usize {
        self.sleeps
            .lock()
            .unwrap()
            .iter()
            .filter(|d| **d == duration)
            .count()
    }
}

#[async_trait]
impl Timer for InstantTimer {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        tokio::task::yield_now().await;
    }
}
