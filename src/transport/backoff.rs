//! Reconnect backoff.
//!
//! `delay = min(base * 2^attempt, cap)`, where `attempt` counts close events
//! since the last successful open.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

// ============================================================================
// Constants
// ============================================================================

/// Delay before the first reconnect attempt.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(1000);

/// Upper bound for any reconnect delay.
pub const DEFAULT_BACKOFF_CAP: Duration = Duration::from_millis(3000);

// ============================================================================
// BackoffPolicy
// ============================================================================

/// Fixed parameters of the exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Delay for attempt 0.
    pub base: Duration,
    /// Maximum delay.
    pub cap: Duration,
}

impl BackoffPolicy {
    /// Creates a policy.
    #[inline]
    #[must_use]
    pub const fn new(base: Duration, cap: Duration) -> Self {
        Self { base, cap }
    }

    /// Returns the delay for the given attempt number.
    ///
    /// Saturates at `cap`, overflow included.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        1u32.checked_shl(attempt)
            .and_then(|factor| self.base.checked_mul(factor))
            .map_or(self.cap, |delay| delay.min(self.cap))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_CAP)
    }
}

// ============================================================================
// Backoff
// ============================================================================

/// Attempt counter driving a [`BackoffPolicy`].
///
/// The counter only grows on [`next_delay`](Self::next_delay) and only
/// returns to zero on [`reset`](Self::reset), which the connection calls
/// after a successful open.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: BackoffPolicy,
    attempt: u32,
}

impl Backoff {
    /// Creates a counter at attempt 0.
    #[inline]
    #[must_use]
    pub const fn new(policy: BackoffPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Returns the delay for the current attempt and advances the counter.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.policy.delay(self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Resets the counter after a successful open.
    #[inline]
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Number of close events since the last successful open.
    #[inline]
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Returns the policy.
    #[inline]
    #[must_use]
    pub const fn policy(&self) -> BackoffPolicy {
        self.policy
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_default_sequence() {
        let mut backoff = Backoff::new(BackoffPolicy::default());
        let delays: Vec<_> = (0..5).map(|_| backoff.next_delay()).collect();
        assert_eq!(delays, vec![ms(1000), ms(2000), ms(3000), ms(3000), ms(3000)]);
        assert_eq!(backoff.attempt(), 5);
    }

    #[test]
    fn test_reset_returns_to_base() {
        let mut backoff = Backoff::new(BackoffPolicy::default());
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.attempt(), 0);
        assert_eq!(backoff.next_delay(), ms(1000));
    }

    #[test]
    fn test_huge_attempt_saturates() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay(31), ms(3000));
        assert_eq!(policy.delay(32), ms(3000));
        assert_eq!(policy.delay(u32::MAX), ms(3000));
    }

    proptest! {
        #[test]
        fn prop_delays_non_decreasing_and_capped(
            base_ms in 1u64..5_000,
            extra_ms in 0u64..60_000,
            steps in 1usize..80,
        ) {
            let policy = BackoffPolicy::new(ms(base_ms), ms(base_ms + extra_ms));
            let mut backoff = Backoff::new(policy);

            let mut previous = Duration::ZERO;
            for _ in 0..steps {
                let delay = backoff.next_delay();
                prop_assert!(delay >= previous);
                prop_assert!(delay <= policy.cap);
                prop_assert!(delay >= policy.base);
                previous = delay;
            }

            backoff.reset();
            prop_assert_eq!(backoff.next_delay(), policy.base);
        }
    }
}
