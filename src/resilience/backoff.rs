//! Capped exponential backoff for ledger retries.

use std::time::Duration;

use rand::Rng;

/// Backoff schedule: `base` doubling per failed attempt, capped at `max`,
/// plus up to a tenth of the capped delay as jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self {
            base: Duration::from_millis(base_ms),
            max: Duration::from_millis(max_ms),
        }
    }

    /// Delay after failed attempt `attempt` (1-based). Attempt 0 waits nothing.
    pub fn delay(&self, attempt: u32) -> Duration {
        let Some(doublings) = attempt.checked_sub(1) else {
            return Duration::ZERO;
        };
        let factor = 1u32.checked_shl(doublings).unwrap_or(u32::MAX);
        let capped = self.base.saturating_mul(factor).min(self.max);
        capped.saturating_add(jitter(capped))
    }
}

fn jitter(delay: Duration) -> Duration {
    let spread_ms = (delay / 10).as_millis() as u64;
    if spread_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..spread_ms))
}
