//! Capped exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::SyncConfig;

/// Largest exponent applied to the base delay; beyond this the cap always
/// wins anyway.
const MAX_EXPONENT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
        }
    }

    /// Un-jittered delay before retry number `attempt` (0-based):
    /// `base * 2^attempt`, capped at `max`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.pow(attempt.min(MAX_EXPONENT));
        self.base.saturating_mul(factor).min(self.max)
    }

    /// [`delay`](Self::delay) with jitter, drawn uniformly from
    /// `[delay / 2, delay]` so many clients do not reconnect in lockstep.
    pub fn jittered(&self, attempt: u32) -> Duration {
        let ceiling = self.delay(attempt).as_millis() as u64;
        let floor = ceiling / 2;
        Duration::from_millis(rand::rng().random_range(floor..=ceiling))
    }
}

impl From<&SyncConfig> for Backoff {
    fn from(config: &SyncConfig) -> Self {
        Self::new(config.reconnect_base, config.reconnect_max)
    }
}
