//! Retry and pacing policies for remote calls.
//!
//! Two independent knobs: [`RetryPolicy`] bounds attempts and computes the
//! exponential backoff applied after rate-limit and transport failures, while
//! [`PacingPolicy`] enforces the fixed minimum gap between consecutive remote
//! calls that keeps a pass under the service's steady-state rate limit. They
//! are deliberately separate so each is testable on its own.

use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;

/// Bounded-attempt retry with exponential backoff.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first one.
    pub max_attempts: u32,
    /// Base backoff delay; doubles per completed retry.
    pub base_delay_ms: u64,
}

impl RetryPolicy {
    /// Backoff before the retry following the given number of completed
    /// attempts: base, 2x base, 4x base, ...
    pub fn delay_for(&self, completed_attempts: u32) -> Duration {
        let factor = 2u64.saturating_pow(completed_attempts.saturating_sub(1));
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

impl Default for RetryPolicy {
    /// Default: 5 attempts, 1s base delay.
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 1_000,
        }
    }
}

/// Fixed minimum delay between consecutive remote calls, regardless of
/// outcome. Distinct from backoff, which applies only after failures.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PacingPolicy {
    pub min_gap_ms: u64,
}

impl PacingPolicy {
    pub fn min_gap(&self) -> Duration {
        Duration::from_millis(self.min_gap_ms)
    }
}

impl Default for PacingPolicy {
    /// Default: 500ms between calls.
    fn default() -> Self {
        Self { min_gap_ms: 500 }
    }
}

/// Tracks the last call time and sleeps out the remainder of the pacing gap.
#[derive(Debug)]
pub struct Pacer {
    policy: PacingPolicy,
    last_call: Option<Instant>,
}

impl Pacer {
    pub fn new(policy: PacingPolicy) -> Self {
        Self {
            policy,
            last_call: None,
        }
    }

    /// Wait until the pacing gap since the previous call has elapsed, then
    /// mark the new call. The first call goes through immediately.
    pub async fn pace(&mut self) {
        if let Some(last) = self.last_call {
            let gap = self.policy.min_gap();
            let elapsed = last.elapsed();
            if elapsed < gap {
                tokio::time::sleep(gap - elapsed).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}
