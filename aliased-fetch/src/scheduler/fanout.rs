//! Bounded fan-out
//!
//! Workers are spawned in input order, each holding a semaphore permit for
//! its whole lifetime. The first failing worker records its error and
//! cancels the run; results are re-assembled in input order.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::error::{FetchError, Result};
use crate::progress::{Phase, Progress};

/// Fan-out of one phase over all accounts
pub struct FanOut {
    phase: Phase,
    semaphore: Arc<Semaphore>,
    cancel: CancelToken,
    progress: Arc<dyn Progress>,
}

impl FanOut {
    /// Creates a fan-out allowing `limit` workers in flight
    pub fn new(phase: Phase, limit: usize, cancel: CancelToken, progress: Arc<dyn Progress>) -> Self {
        Self {
            phase,
            semaphore: Arc::new(Semaphore::new(limit)),
            cancel,
            progress,
        }
    }

    /// Runs `work` for every item and returns the outputs in item order
    ///
    /// Fails with the first non-cancelled worker error, or with
    /// [`FetchError::Cancelled`] when the token fired during the phase.
    pub async fn run<T, R, F, Fut>(&self, items: Vec<T>, work: F) -> Result<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let first_error: Arc<Mutex<Option<FetchError>>> = Arc::new(Mutex::new(None));
        let completed = Arc::new(AtomicUsize::new(0));
        let total = items.len();
        let mut handles = Vec::with_capacity(total);

        for item in items {
            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                permit = self.semaphore.clone().acquire_owned() => {
                    permit.map_err(|e| FetchError::Worker(e.to_string()))?
                }
            };

            if self.cancel.is_cancelled() {
                break;
            }

            handles.push(self.spawn_worker(
                work(item),
                permit,
                Arc::clone(&first_error),
                Arc::clone(&completed),
            ));
        }

        if handles.len() < total {
            debug!(
                "{:?} phase stopped after starting {} of {} workers",
                self.phase,
                handles.len(),
                total
            );
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("{:?} worker panicked: {}", self.phase, e);
                    record(&first_error, FetchError::Worker(e.to_string()));
                    self.cancel.cancel();
                    results.push(None);
                }
            }
        }

        if let Some(err) = take(&first_error) {
            return Err(err);
        }
        self.cancel.check()?;

        // Every worker started and succeeded
        Ok(results.into_iter().flatten().collect())
    }

    /// Spawns one worker; the permit is released when the task ends
    fn spawn_worker<R, Fut>(
        &self,
        task: Fut,
        permit: OwnedSemaphorePermit,
        first_error: Arc<Mutex<Option<FetchError>>>,
        completed: Arc<AtomicUsize>,
    ) -> JoinHandle<Option<R>>
    where
        R: Send + 'static,
        Fut: Future<Output = Result<R>> + Send + 'static,
    {
        let phase = self.phase;
        let cancel = self.cancel.clone();
        let progress = Arc::clone(&self.progress);

        tokio::spawn(async move {
            let _permit = permit;

            match task.await {
                Ok(output) => {
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress.update(phase, done);
                    Some(output)
                }
                Err(e) => {
                    if !e.is_cancelled() {
                        debug!("{:?} worker failed: {}", phase, e);
                        record(&first_error, e);
                    }
                    cancel.cancel();
                    None
                }
            }
        })
    }
}

/// Keeps only the first error of the phase
fn record(slot: &Mutex<Option<FetchError>>, err: FetchError) {
    let mut slot = slot.lock().unwrap_or_else(|e| e.into_inner());
    if slot.is_none() {
        *slot = Some(err);
    }
}

fn take(slot: &Mutex<Option<FetchError>>) -> Option<FetchError> {
    slot.lock().unwrap_or_else(|e| e.into_inner()).take()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use aliased_client::ProviderError;
    use std::time::Duration;

    fn fan_out(limit: usize, cancel: &CancelToken) -> FanOut {
        FanOut::new(Phase::Aliases, limit, cancel.clone(), Arc::new(NoProgress))
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_keep_input_order() {
        let cancel = CancelToken::new();
        let items: Vec<u64> = (0..25).collect();

        // Later items finish first
        let results = fan_out(10, &cancel)
            .run(items, |n| async move {
                tokio::time::sleep(Duration::from_millis(100 - n)).await;
                Ok::<_, FetchError>(n * 2)
            })
            .await
            .unwrap();

        assert_eq!(results, (0..25).map(|n| n * 2).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_never_exceeds_limit() {
        let cancel = CancelToken::new();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        fan_out(3, &cancel)
            .run((0..12).collect::<Vec<u32>>(), |_| {
                let in_flight = Arc::clone(&in_flight);
                let peak = Arc::clone(&peak);
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, FetchError>(())
                }
            })
            .await
            .unwrap();

        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_error_cancels_peers() {
        let cancel = CancelToken::new();
        let started = Arc::new(AtomicUsize::new(0));

        let err = fan_out(1, &cancel)
            .run((0..10).collect::<Vec<u32>>(), |n| {
                let started = Arc::clone(&started);
                async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    if n == 2 {
                        return Err(FetchError::from(ProviderError::authentication("token expired")));
                    }
                    Ok(n)
                }
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "token expired");
        assert!(cancel.is_cancelled());
        assert_eq!(started.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_runs_nothing() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = fan_out(10, &cancel)
            .run(vec![1, 2, 3], |n| async move { Ok::<_, FetchError>(n) })
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_empty_input() {
        let cancel = CancelToken::new();
        let results: Vec<u8> = fan_out(1, &cancel)
            .run(Vec::<u8>::new(), |n| async move { Ok::<_, FetchError>(n) })
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
