//! Randomized waits between outbound requests.
//!
//! Two kinds of wait exist: the politeness delay before each candidate fetch and
//! the longer backoff between extraction attempts. Both are drawn from a
//! [`DelayPolicy`] so tests can swap in [`NoDelay`].

use crate::config::{PipelineConfig, SecondsRange};
use rand::{Rng, rng};
use std::fmt;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// What a wait is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayKind {
    /// Before fetching a fresh candidate.
    Politeness,
    /// Between extraction attempts for the same URL.
    RetryBackoff,
}

/// Strategy deciding how long to wait before the next request.
pub trait DelayPolicy: fmt::Debug + Send + Sync {
    fn next_delay(&self, kind: DelayKind) -> Duration;
}

/// Uniformly random waits within configured bounds.
#[derive(Debug, Clone)]
pub struct RandomDelay {
    politeness: SecondsRange,
    retry_backoff: SecondsRange,
}

impl RandomDelay {
    pub fn new(politeness: SecondsRange, retry_backoff: SecondsRange) -> Self {
        Self {
            politeness,
            retry_backoff,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.politeness_delay, config.retry_backoff)
    }
}

impl DelayPolicy for RandomDelay {
    fn next_delay(&self, kind: DelayKind) -> Duration {
        let range = match kind {
            DelayKind::Politeness => self.politeness,
            DelayKind::RetryBackoff => self.retry_backoff,
        };
        let (low, high) = range.bounds();
        let secs = if high > low {
            rng().random_range(low..=high)
        } else {
            low
        };
        Duration::from_secs_f64(secs)
    }
}

/// Never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl DelayPolicy for NoDelay {
    fn next_delay(&self, _kind: DelayKind) -> Duration {
        Duration::ZERO
    }
}

/// Sleep for the policy's next delay unless the token fires first.
///
/// Returns `false` when the wait was cut short by cancellation.
pub async fn pause(policy: &dyn DelayPolicy, kind: DelayKind, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    let delay = policy.next_delay(kind);
    if delay.is_zero() {
        return true;
    }
    debug!(?kind, ?delay, "Waiting before next request");
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = sleep(delay) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_delay_stays_in_bounds() {
        let policy = RandomDelay::new(SecondsRange(0.8, 2.0), SecondsRange(1.5, 3.0));
        for _ in 0..200 {
            let polite = policy.next_delay(DelayKind::Politeness).as_secs_f64();
            assert!((0.8..=2.0).contains(&polite), "politeness {polite}");
            let backoff = policy.next_delay(DelayKind::RetryBackoff).as_secs_f64();
            assert!((1.5..=3.0).contains(&backoff), "backoff {backoff}");
        }
    }

    #[test]
    fn test_degenerate_range_is_fixed() {
        let policy = RandomDelay::new(SecondsRange(0.25, 0.25), SecondsRange(0.0, 0.0));
        assert_eq!(policy.next_delay(DelayKind::Politeness), Duration::from_millis(250));
        assert_eq!(policy.next_delay(DelayKind::RetryBackoff), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_pause_without_delay_returns_immediately() {
        let token = CancellationToken::new();
        assert!(pause(&NoDelay, DelayKind::Politeness, &token).await);
    }

    #[tokio::test]
    async fn test_pause_reports_cancellation() {
        let token = CancellationToken::new();
        token.cancel();
        let policy = RandomDelay::new(SecondsRange(5.0, 5.0), SecondsRange(5.0, 5.0));
        assert!(!pause(&policy, DelayKind::RetryBackoff, &token).await);
    }

    #[tokio::test]
    async fn test_pause_cancelled_mid_sleep() {
        let token = CancellationToken::new();
        let child = token.clone();
        let policy = RandomDelay::new(SecondsRange(60.0, 60.0), SecondsRange(60.0, 60.0));
        let handle = tokio::spawn(async move {
            pause(&policy, DelayKind::Politeness, &child).await
        });
        tokio::task::yield_now().await;
        token.cancel();
        assert!(!handle.await.unwrap());
    }
}
