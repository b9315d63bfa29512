//! Exponential backoff with symmetric jitter

use std::time::Duration;

use rand::Rng;

/// Apply jitter to `base`, drawn uniformly from `[-base/8, +base/8)`.
///
/// The result always lies within 87.5% to 112.5% of `base`.
pub fn jittered<R: Rng + ?Sized>(base: Duration, rng: &mut R) -> Duration {
    let spread = u64::try_from(base.as_nanos() / 4).unwrap_or(u64::MAX);
    if spread == 0 {
        return base;
    }

    let offset = Duration::from_nanos(rng.gen_range(0..spread));
    let eighth = Duration::from_nanos(spread / 2);
    base.saturating_add(offset).saturating_sub(eighth)
}

/// Delay sequence `base, 2*base, 4*base, ...`, each jittered around the
/// current (not the original) base.
///
/// There is no upper cap; growth is bounded only by the number of attempts.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    current: Duration,
}

impl ExponentialBackoff {
    pub fn new(base: Duration) -> Self {
        Self { current: base }
    }

    /// The un-jittered delay the next call to [`next_delay`](Self::next_delay)
    /// centers on.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Jittered delay for the next wait; doubles the base afterwards.
    pub fn next_delay(&mut self) -> Duration {
        let delay = jittered(self.current, &mut rand::thread_rng());
        self.current = self.current.saturating_mul(2);
        delay
    }
}
