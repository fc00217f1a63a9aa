//! # Exponential Backoff
//!
//! One failure counter per listener, shared by the historical task and the
//! subscription loop. The n-th consecutive failure waits `(2^n - 1)` units;
//! exceeding the retry budget is terminal.

use crate::domain::ListenerError;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

/// Shared failure counter.
#[derive(Debug, Clone)]
pub struct Backoff {
    count: Arc<AtomicU32>,
    max_retries: u32,
    unit: Duration,
}

impl Backoff {
    /// Counter at zero.
    pub fn new(max_retries: u32, unit: Duration) -> Self {
        Self {
            count: Arc::new(AtomicU32::new(0)),
            max_retries,
            unit,
        }
    }

    /// Consecutive failures recorded.
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }

    /// Clear the counter after a success.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }

    /// Delay for the `attempt`-th consecutive failure.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = (1u32 << attempt.min(31)) - 1;
        self.unit.saturating_mul(factor)
    }

    /// Record a failure and sleep, or fail once the budget is spent.
    ///
    /// Returns early without error if `cancel` fires during the sleep.
    pub async fn wait(&self, cancel: &CancellationToken) -> Result<(), ListenerError> {
        let attempt = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt > self.max_retries {
            error!(
                attempts = attempt,
                max_retries = self.max_retries,
                "[cn-03] Backoff budget exhausted"
            );
            return Err(ListenerError::BackoffExhausted {
                retries: self.max_retries,
            });
        }

        let delay = self.delay_for(attempt);
        warn!(attempt, delay_secs = delay.as_secs_f64(), "[cn-03] Backing off");
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(delay) => {}
        }
        Ok(())
    }
}
