//! Bounded-concurrency admission gate for fetch tasks.
//!
//! The pool is purely an admission gate: tasks are admitted in
//! submission order up to the ceiling, completions free slots for the
//! next queued task, and nothing is retried or prioritized.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Clone)]
pub struct FetchPool {
    permits: Arc<Semaphore>
}

impl FetchPool {
    /// Creates a pool with the given concurrency ceiling.
    pub fn new(limit: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(limit.max(1)))
        }
    }

    /// Suspends until a slot is free (slots are granted in submission
    /// order), then runs `task` to completion. The slot is released when
    /// the task finishes, success or failure alike.
    pub async fn run<F: Future>(&self, task: F) -> F::Output {
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("fetch pool semaphore never closes");
        task.await
    }
}
