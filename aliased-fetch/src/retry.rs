//! Bounded exponential backoff for transport failures

use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

use aliased_client::ProviderError;

use crate::cancel::CancelToken;
use crate::error::{FetchError, Result};

/// Retry schedule for provider calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; 0 disables retrying
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Runs `op` until it succeeds, fails with a non-transport error, or the
/// retries run out
///
/// The delay doubles after each failure, capped at `max_delay`. Backoff
/// sleeps end early with [`FetchError::Cancelled`] when `cancel` fires.
pub async fn with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    what: &str,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, ProviderError>>,
{
    let mut attempt = 0;
    let mut delay = policy.initial_delay;

    loop {
        attempt += 1;

        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    info!("{} succeeded after {} attempt(s)", what, attempt);
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() && attempt <= policy.max_retries => {
                warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {:?}...",
                    what,
                    attempt,
                    policy.max_retries + 1,
                    e,
                    delay
                );

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                }

                delay = (delay * 2).min(policy.max_delay);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aliased_client::ErrorKind;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_retries_transport_with_doubling_delay() {
        let calls = &AtomicU32::new(0);
        let started = Instant::now();

        let value = with_backoff(&RetryPolicy::default(), &CancelToken::new(), "list", move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 3 {
                Err(ProviderError::transport("connection reset"))
            } else {
                Ok(7)
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // 200ms + 400ms + 800ms
        assert_eq!(started.elapsed(), Duration::from_millis(1400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let calls = &AtomicU32::new(0);
        let err = with_backoff(&RetryPolicy::default(), &CancelToken::new(), "list", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(ProviderError::transport("timed out"))
        })
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = &AtomicU32::new(0);
        let err = with_backoff(&RetryPolicy::default(), &CancelToken::new(), "list", move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(ProviderError::authentication("bad key"))
        })
        .await
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_backoff() {
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = with_backoff(&RetryPolicy::default(), &cancel, "list", || async {
            Err::<(), _>(ProviderError::transport("timed out"))
        })
        .await
        .unwrap_err();

        assert!(err.is_cancelled());
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy::default();
        let mut delay = policy.initial_delay;
        for _ in 0..10 {
            delay = (delay * 2).min(policy.max_delay);
        }
        assert_eq!(delay, Duration::from_secs(5));
    }
}
