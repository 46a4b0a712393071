//! Time abstractions: wall-clock stamps and cooperative suspension.
//!
//! Every wait in the game (dice settle polling, card animation polling, the
//! AI presentation delay) goes through a [`Timer`], so tests can swap the
//! tokio timer for one that returns immediately.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Abstraction over system time, used to stamp journal events.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A suspension point on the game's single logical timeline.
#[async_trait]
pub trait Timer: Send + Sync {
    /// Suspends the caller for `duration`, letting other tasks run.
    async fn sleep(&self, duration: Duration);
}

/// Production timer backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
