//! Configuration for sessions and the supervisor.

use std::time::Duration;

/// Default lower bound for the inter-poll delay.
pub const DEFAULT_MIN_DELAY: Duration = Duration::from_secs(30);

/// Default upper bound for the inter-poll delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(300);

/// Default bound on how long `stop_all` waits for a session to stop.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-session delay bounds, fixed at session start.
///
/// Each iteration sleeps a uniformly random duration in
/// `[min_delay, max_delay]`. Inverted bounds are swapped at use; a zero
/// upper bound is invalid and replaced by the default range - both are
/// recoverable configuration mistakes, never errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Minimum inter-poll delay
    pub min_delay: Duration,

    /// Maximum inter-poll delay
    pub max_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl SessionConfig {
    /// Create a config with explicit delay bounds.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            min_delay,
            max_delay,
        }
    }

    /// The effective `[min, max]` bounds the sleep samples from.
    ///
    /// Swaps inverted bounds; substitutes the documented default range
    /// when the upper bound is zero (a zero sleep would hot-loop the
    /// source).
    pub fn delay_bounds(&self) -> (Duration, Duration) {
        let (mut min, mut max) = (self.min_delay, self.max_delay);
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        if max.is_zero() {
            return (DEFAULT_MIN_DELAY, DEFAULT_MAX_DELAY);
        }
        (min, max)
    }
}
