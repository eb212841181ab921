//! Reconnection retry accounting.
//!
//! The supervisor's reconnect behavior is driven by a single
//! authoritative counter of consecutive connection failures: a fixed
//! delay between attempts, a hard cap on attempts, and a reset to zero
//! on every successful open.

use std::time::Duration;

/// What to do after a connection failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait for the fixed delay, then reconnect.
    Retry(Duration),
    /// Attempts exhausted; enter the terminal failed state.
    GiveUp,
}

/// Bounded fixed-delay retry policy.
#[derive(Debug)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    failures: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts,
            delay: Duration::from_millis(delay_ms),
            failures: 0,
        }
    }

    /// Record a successful open; the failure counter starts over.
    pub fn record_open(&mut self) {
        self.failures = 0;
    }

    /// Record a connection failure and decide whether to retry.
    pub fn record_failure(&mut self) -> RetryDecision {
        if self.failures >= self.max_attempts {
            return RetryDecision::GiveUp;
        }
        self.failures += 1;
        RetryDecision::Retry(self.delay)
    }

    /// Number of consecutive failures so far.
    pub fn failures(&self) -> u32 {
        self.failures
    }
}
