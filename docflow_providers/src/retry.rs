use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Backoff schedule for transport-level failures.
///
/// One attempt per entry in `base_delays_secs` (each followed by that delay),
/// then `final_retries` more attempts spaced by `final_delay_secs`. At least
/// one attempt is always made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "RetryPolicy::default_base_delays")]
    pub base_delays_secs: Vec<u64>,
    #[serde(default)]
    pub final_retries: usize,
    #[serde(default = "RetryPolicy::default_final_delay")]
    pub final_delay_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delays_secs: Self::default_base_delays(),
            final_retries: 0,
            final_delay_secs: Self::default_final_delay(),
        }
    }
}

impl RetryPolicy {
    fn default_base_delays() -> Vec<u64> {
        vec![1, 2, 4]
    }

    const fn default_final_delay() -> u64 {
        10
    }

    /// A policy that makes exactly one attempt.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            base_delays_secs: Vec::new(),
            final_retries: 0,
            final_delay_secs: 0,
        }
    }

    #[must_use]
    pub fn total_attempts(&self) -> usize {
        (self.base_delays_secs.len() + self.final_retries).max(1)
    }

    /// Delay to wait after the given 1-based failed attempt.
    #[must_use]
    pub fn delay_after(&self, attempt: usize) -> Duration {
        let secs = self
            .base_delays_secs
            .get(attempt.saturating_sub(1))
            .copied()
            .unwrap_or(self.final_delay_secs);
        Duration::from_secs(secs)
    }
}

/// Retry an async operation following `policy`.
///
/// # Returns
/// The first successful result, or the error of the last attempt.
pub async fn retry_with_backoff<F, Fut, T, E>(operation: F, policy: &RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
{
    retry_with_backoff_if(operation, policy, |_| true).await
}

/// Like [`retry_with_backoff`], but only errors accepted by `should_retry`
/// are retried; any other error is returned at once.
pub async fn retry_with_backoff_if<F, Fut, T, E, P>(
    mut operation: F,
    policy: &RetryPolicy,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
    P: Fn(&E) -> bool,
{
    let total = policy.total_attempts();
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt >= total => return Err(e),
            Err(e) if !should_retry(&e) => {
                warn!("Request failed (attempt {}/{}): {e}. Not retrying", attempt, total);
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    "Request failed (attempt {}/{}): {e}. Retrying after {}s...",
                    attempt,
                    total,
                    delay.as_secs()
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn instant_policy(base: usize, final_retries: usize) -> RetryPolicy {
        RetryPolicy {
            base_delays_secs: vec![0; base],
            final_retries,
            final_delay_secs: 0,
        }
    }

    #[tokio::test]
    async fn retry_succeeds_on_first_attempt() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result = retry_with_backoff(
            || {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Ok::<(), String>(())
                }
            },
            &instant_policy(2, 2),
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_succeeds_after_failures() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: std::result::Result<(), String> = retry_with_backoff(
            || {
                let attempts = attempts.clone();
                async move {
                    let count = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    if count < 3 {
                        Err(String::from("fail"))
                    } else {
                        Ok(())
                    }
                }
            },
            &instant_policy(2, 2),
        )
        .await;
        assert!(result.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_fails_after_all_attempts() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: std::result::Result<(), String> = retry_with_backoff(
            || {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(String::from("fail"))
                }
            },
            &instant_policy(2, 2),
        )
        .await;
        assert_eq!(result, Err(String::from("fail")));
        assert_eq!(attempts.load(Ordering::SeqCst), 4); // 2 base + 2 final
    }

    #[tokio::test]
    async fn empty_policy_still_makes_one_attempt() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: std::result::Result<(), String> = retry_with_backoff(
            || {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err(String::from("down"))
                }
            },
            &RetryPolicy::none(),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn permanent_errors_stop_immediately() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: std::result::Result<(), String> = retry_with_backoff_if(
            || {
                let attempts = attempts.clone();
                async move {
                    let count = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    if count == 1 {
                        Err(String::from("busy"))
                    } else {
                        Err(String::from("unauthorized"))
                    }
                }
            },
            &instant_policy(4, 0),
            |e| e == "busy",
        )
        .await;
        assert_eq!(result, Err(String::from("unauthorized")));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn delays_follow_base_then_final() {
        let policy = RetryPolicy {
            base_delays_secs: vec![1, 2],
            final_retries: 2,
            final_delay_secs: 10,
        };
        assert_eq!(policy.total_attempts(), 4);
        assert_eq!(policy.delay_after(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after(2), Duration::from_secs(2));
        assert_eq!(policy.delay_after(3), Duration::from_secs(10));
    }
}
