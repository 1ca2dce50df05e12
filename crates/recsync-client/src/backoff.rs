//! Reconnect delay scheduling.
//!
//! Classic capped exponential backoff: `delay = min(base * 2^attempt,
//! max)`, attempt reset on a successful open. No jitter — the push channel
//! carries one connection per session, not a thundering herd.

use std::time::Duration;

/// Capped exponential delay sequence for reconnect scheduling.
#[derive(Clone, Copy, Debug)]
pub struct ReconnectBackoff {
    base: Duration,
    max: Duration,
    attempt: u32,
}

impl ReconnectBackoff {
    /// Create a backoff starting at `base` and capped at `max`.
    #[must_use]
    pub const fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            attempt: 0,
        }
    }

    /// Delay for the next scheduled reconnect; advances the attempt count.
    pub fn next_delay(&mut self) -> Duration {
        let factor = 2u32.saturating_pow(self.attempt);
        let delay = self.base.saturating_mul(factor).min(self.max);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Number of reconnects scheduled since the last successful open.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Reset after a successful open: the next failure starts over at
    /// `base`.
    pub const fn reset(&mut self) {
        self.attempt = 0;
    }
}
