//! Fan-out/fan-in over a fixed number of tasks.
//!
//! A `ConcurrentResult` is created for exactly `count` units of work. Each
//! unit gets a `Reporter` and reports one outcome through it. Collecting
//! performs exactly `count` receives and stops at the first error, which
//! also fires the shared cancellation signal.
//!
//! Successful results are returned in completion order.

use std::future::Future;

use tokio::sync::{mpsc, watch};

use crate::error::{FigoroError, FigoroResult};

pub struct ConcurrentResult<T> {
    count: usize,
    results_tx: mpsc::Sender<T>,
    results_rx: mpsc::Receiver<T>,
    errors_tx: mpsc::Sender<FigoroError>,
    errors_rx: mpsc::Receiver<FigoroError>,
    cancel: watch::Sender<bool>,
}

/// Handle given to a single unit of work.
///
/// Sending consumes the reporter, so a task can report at most once.
/// Sends never block: both channels hold `count` outcomes, and anything sent
/// after the coordinator has returned is dropped.
pub struct Reporter<T> {
    results: mpsc::Sender<T>,
    errors: mpsc::Sender<FigoroError>,
    cancel: watch::Receiver<bool>,
}

impl<T: Send + 'static> ConcurrentResult<T> {
    pub fn new(count: usize) -> Self {
        // mpsc channels need a non-zero capacity
        let capacity = count.max(1);
        let (results_tx, results_rx) = mpsc::channel(capacity);
        let (errors_tx, errors_rx) = mpsc::channel(capacity);
        let (cancel, _) = watch::channel(false);

        ConcurrentResult {
            count,
            results_tx,
            results_rx,
            errors_tx,
            errors_rx,
            cancel,
        }
    }

    /// Launch `count` tasks built by `factory` and collect their outcomes.
    pub async fn run<F, Fut>(count: usize, mut factory: F) -> FigoroResult<Vec<T>>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = FigoroResult<T>> + Send + 'static,
    {
        let coordinator = Self::new(count);
        for i in 0..count {
            coordinator.spawn(factory(i));
        }
        coordinator.results().await
    }

    pub fn reporter(&self) -> Reporter<T> {
        Reporter {
            results: self.results_tx.clone(),
            errors: self.errors_tx.clone(),
            cancel: self.cancel.subscribe(),
        }
    }

    /// Run `task` on the runtime, reporting its outcome.
    ///
    /// The task future is dropped as soon as cancellation fires.
    pub fn spawn<Fut>(&self, task: Fut)
    where
        Fut: Future<Output = FigoroResult<T>> + Send + 'static,
    {
        let reporter = self.reporter();
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = reporter.cancelled() => None,
                outcome = task => Some(outcome),
            };
            match outcome {
                Some(outcome) => reporter.report(outcome),
                None => tracing::trace!("task cancelled before completion"),
            }
        });
    }

    /// Fire the cancellation signal. Cannot be undone.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// Wait for `count` outcomes.
    ///
    /// Returns the first error received and discards any results that arrived
    /// before it. If every reporter is gone before `count` outcomes arrived,
    /// fails with `WorkerLost` instead of waiting forever.
    pub async fn results(self) -> FigoroResult<Vec<T>> {
        let ConcurrentResult {
            count,
            results_tx,
            mut results_rx,
            errors_tx,
            mut errors_rx,
            cancel,
        } = self;

        // Only reporters keep the channels open from here on
        drop(results_tx);
        drop(errors_tx);

        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            tokio::select! {
                biased;
                Some(err) = errors_rx.recv() => {
                    cancel.send_replace(true);
                    return Err(err);
                }
                Some(result) = results_rx.recv() => results.push(result),
                else => {
                    cancel.send_replace(true);
                    return Err(FigoroError::WorkerLost);
                }
            }
        }

        Ok(results)
    }
}

impl<T> Reporter<T> {
    pub fn report(self, outcome: FigoroResult<T>) {
        match outcome {
            Ok(result) => self.send_result(result),
            Err(err) => self.send_error(err),
        }
    }

    pub fn send_result(self, result: T) {
        if self.results.try_send(result).is_err() {
            tracing::trace!("result dropped, collector already returned");
        }
    }

    pub fn send_error(self, err: FigoroError) {
        if let Err(e) = self.errors.try_send(err) {
            tracing::trace!("error dropped, collector already returned: {}", e.into_inner());
        }
    }

    /// True once cancellation fired or the coordinator is gone.
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow() || self.cancel.has_changed().is_err()
    }

    /// Resolves once cancellation fires or the coordinator is dropped.
    pub async fn cancelled(&self) {
        let mut cancel = self.cancel.clone();
        // Err means the coordinator was dropped, which counts as cancellation
        let _ = cancel.wait_for(|cancelled| *cancelled).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    fn failure(msg: &str) -> FigoroError {
        FigoroError::Provider(msg.to_string())
    }

    #[tokio::test]
    async fn collects_all_results() {
        let results = ConcurrentResult::run(4, |i| async move { Ok(i * 10) })
            .await
            .unwrap();

        let mut sorted = results.clone();
        sorted.sort();
        assert_eq!(sorted, vec![0, 10, 20, 30]);
    }

    #[tokio::test]
    async fn zero_tasks_yield_empty_result() {
        let results: Vec<u32> = ConcurrentResult::run(0, |_| async { Ok(7) })
            .await
            .unwrap();

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn results_come_back_in_completion_order() {
        let coordinator = ConcurrentResult::new(3);
        let first = coordinator.reporter();
        let second = coordinator.reporter();
        let third = coordinator.reporter();

        third.send_result("c");
        first.send_result("a");
        second.send_result("b");

        assert_eq!(coordinator.results().await.unwrap(), vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn error_discards_earlier_results_and_cancels_peers() {
        let coordinator = ConcurrentResult::new(4);
        let ok_a = coordinator.reporter();
        let ok_b = coordinator.reporter();
        let failing = coordinator.reporter();
        let pending = coordinator.reporter();

        ok_a.send_result(1);
        ok_b.send_result(2);
        failing.send_error(failure("boom"));

        let err = coordinator.results().await.unwrap_err();

        assert!(matches!(err, FigoroError::Provider(ref m) if m == "boom"));
        assert!(pending.is_cancelled());
        // Late sends must not block or panic
        pending.send_result(3);
    }

    #[tokio::test]
    async fn only_first_error_is_returned() {
        let coordinator: ConcurrentResult<u8> = ConcurrentResult::new(2);
        let first = coordinator.reporter();
        let second = coordinator.reporter();

        first.send_error(failure("first"));
        second.send_error(failure("second"));

        let err = coordinator.results().await.unwrap_err();
        assert!(matches!(err, FigoroError::Provider(ref m) if m == "first"));
    }

    #[tokio::test]
    async fn missing_reporter_fails_instead_of_hanging() {
        let coordinator = ConcurrentResult::new(2);
        let sends = coordinator.reporter();
        let lost = coordinator.reporter();

        sends.send_result(1);
        drop(lost);

        let err = tokio::time::timeout(Duration::from_secs(5), coordinator.results())
            .await
            .expect("collector must not hang")
            .unwrap_err();
        assert!(matches!(err, FigoroError::WorkerLost));
    }

    #[tokio::test]
    async fn dropping_the_coordinator_cancels_reporters() {
        let coordinator: ConcurrentResult<()> = ConcurrentResult::new(1);
        let reporter = coordinator.reporter();
        assert!(!reporter.is_cancelled());

        drop(coordinator);

        assert!(reporter.is_cancelled());
        tokio::time::timeout(Duration::from_secs(5), reporter.cancelled())
            .await
            .expect("cancelled() resolves once the coordinator is gone");
    }

    #[tokio::test]
    async fn explicit_cancel_is_seen_by_reporters() {
        let coordinator: ConcurrentResult<()> = ConcurrentResult::new(1);
        let reporter = coordinator.reporter();

        coordinator.cancel();

        assert!(reporter.is_cancelled());
    }

    struct DropSignal(Option<oneshot::Sender<()>>);

    impl Drop for DropSignal {
        fn drop(&mut self) {
            if let Some(tx) = self.0.take() {
                let _ = tx.send(());
            }
        }
    }

    #[tokio::test]
    async fn in_flight_task_is_dropped_after_first_error() {
        let (dropped_tx, dropped_rx) = oneshot::channel();
        let guard = DropSignal(Some(dropped_tx));

        let coordinator: ConcurrentResult<u8> = ConcurrentResult::new(2);
        coordinator.spawn(async move {
            let _guard = guard;
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(1)
        });
        coordinator.spawn(async { Err(failure("transport")) });

        let err = coordinator.results().await.unwrap_err();
        assert!(matches!(err, FigoroError::Provider(_)));

        tokio::time::timeout(Duration::from_secs(5), dropped_rx)
            .await
            .expect("slow task should be dropped on cancellation")
            .unwrap();
    }
}
