//! # Task Pool
//!
//! A managed home for short-lived background units of work.
//!
//! `tokio::spawn` alone is fire-and-forget: nobody owns the handle, a panic is only
//! visible in the runtime's stderr output, and shutting down the process silently
//! abandons whatever was still running. `TaskPool` keeps every spawned unit in a
//! [`JoinSet`] so the owner can either **drain** (wait for everything in flight) or
//! **abort** (cancel everything in flight) at shutdown, and so panics are counted and
//! logged instead of lost.
//!
//! Finished tasks are reaped on every [`spawn`](TaskPool::spawn), so the set only
//! grows with the number of units actually in flight.
//!
//! ```rust
//! use dispatch_framework::TaskPool;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = TaskPool::new("completions");
//!     for ms in [5, 10, 15] {
//!         pool.spawn(async move {
//!             tokio::time::sleep(Duration::from_millis(ms)).await;
//!         });
//!     }
//!
//!     let report = pool.drain().await;
//!     assert_eq!(report.completed, 3);
//! }
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info};

/// Outcome counters for every task that has left the pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    pub completed: usize,
    pub panicked: usize,
    pub cancelled: usize,
}

impl PoolReport {
    pub fn total(&self) -> usize {
        self.completed + self.panicked + self.cancelled
    }
}

struct PoolState {
    tasks: JoinSet<()>,
    report: PoolReport,
}

/// A cloneable handle to a set of managed background tasks.
#[derive(Clone)]
pub struct TaskPool {
    name: &'static str,
    state: Arc<Mutex<PoolState>>,
}

impl TaskPool {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: Arc::new(Mutex::new(PoolState {
                tasks: JoinSet::new(),
                report: PoolReport::default(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spawns a unit of work onto the current runtime and tracks it.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut state = self.lock();
        while let Some(result) = state.tasks.try_join_next() {
            record(self.name, &mut state.report, result);
        }
        state.tasks.spawn(task);
    }

    /// Number of tasks spawned and not yet reaped.
    pub fn in_flight(&self) -> usize {
        self.lock().tasks.len()
    }

    /// Counters for every task reaped so far.
    pub fn report(&self) -> PoolReport {
        self.lock().report
    }

    /// Waits for every task in flight, including tasks spawned while draining.
    ///
    /// Returns the cumulative report for the lifetime of the pool.
    pub async fn drain(&self) -> PoolReport {
        info!(pool = self.name, in_flight = self.in_flight(), "Draining");
        loop {
            let mut tasks = std::mem::replace(&mut self.lock().tasks, JoinSet::new());
            if tasks.is_empty() {
                break;
            }
            let mut drained = PoolReport::default();
            while let Some(result) = tasks.join_next().await {
                record(self.name, &mut drained, result);
            }
            self.merge(drained);
        }
        let report = self.report();
        info!(pool = self.name, ?report, "Drained");
        report
    }

    /// Cancels every task in flight and waits for the cancellations to land.
    ///
    /// Cancelled futures are dropped, so any guard they own runs its `Drop`.
    pub async fn abort_all(&self) -> PoolReport {
        let mut tasks = std::mem::replace(&mut self.lock().tasks, JoinSet::new());
        info!(pool = self.name, in_flight = tasks.len(), "Aborting");
        tasks.abort_all();
        let mut aborted = PoolReport::default();
        while let Some(result) = tasks.join_next().await {
            record(self.name, &mut aborted, result);
        }
        self.merge(aborted);
        let report = self.report();
        info!(pool = self.name, ?report, "Aborted");
        report
    }

    fn merge(&self, other: PoolReport) {
        let mut state = self.lock();
        state.report.completed += other.completed;
        state.report.panicked += other.panicked;
        state.report.cancelled += other.cancelled;
    }
}

impl std::fmt::Debug for TaskPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPool")
            .field("name", &self.name)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

fn record(pool: &'static str, report: &mut PoolReport, result: Result<(), JoinError>) {
    match result {
        Ok(()) => report.completed += 1,
        Err(e) if e.is_panic() => {
            error!(pool, error = %e, "Task panicked");
            report.panicked += 1;
        }
        Err(e) => {
            debug!(pool, error = %e, "Task cancelled");
            report.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_drain_waits_for_all_tasks() {
        let pool = TaskPool::new("test");
        let done = Arc::new(AtomicUsize::new(0));

        for i in 1..=5u64 {
            let done = done.clone();
            pool.spawn(async move {
                tokio::time::sleep(Duration::from_secs(i)).await;
                done.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(pool.in_flight(), 5);

        let report = pool.drain().await;
        assert_eq!(done.load(Ordering::SeqCst), 5);
        assert_eq!(report.completed, 5);
        assert_eq!(pool.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_all_cancels_pending_tasks() {
        let pool = TaskPool::new("test");
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let done = done.clone();
            pool.spawn(async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                done.fetch_add(1, Ordering::SeqCst);
            });
        }

        let report = pool.abort_all().await;
        assert_eq!(report.cancelled, 3);
        assert_eq!(done.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_panic_is_counted_not_propagated() {
        let pool = TaskPool::new("test");
        pool.spawn(async { panic!("unit failed") });
        pool.spawn(async {});

        let report = pool.drain().await;
        assert_eq!(report.panicked, 1);
        assert_eq!(report.completed, 1);
    }

    #[tokio::test]
    async fn test_spawn_reaps_finished_tasks() {
        let pool = TaskPool::new("test");
        pool.spawn(async {});
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        pool.spawn(async {});
        assert_eq!(pool.report().completed, 1);
        assert_eq!(pool.in_flight(), 1);
        pool.drain().await;
    }
}
