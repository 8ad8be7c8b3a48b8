//! Background execution for async hooks.
//!
//! `use_async_state` and `use_async_ref` run their supplier off the UI
//! thread on an [`Executor`] and marshal the result back through the
//! session's [`Scheduler`](crate::schedule::Scheduler). The default is a
//! small shared [`WorkerPool`]; hosts with their own thread budget pass an
//! explicit executor to the `_on` hook variants.

use std::sync::OnceLock;
use std::thread;

use crossbeam_channel::{Sender, unbounded};

use crate::schedule::Job;

pub trait Executor: Send + Sync {
    fn execute(&self, job: Job);
}

/// Fixed pool of named worker threads draining a job queue.
pub struct WorkerPool {
    queue: Sender<Job>,
}

impl WorkerPool {
    pub fn new(threads: usize) -> Self {
        let (tx, rx) = unbounded::<Job>();
        for index in 0..threads.max(1) {
            let rx = rx.clone();
            let spawned = thread::Builder::new()
                .name(format!("coffer-worker-{index}"))
                .spawn(move || {
                    while let Ok(job) = rx.recv() {
                        job();
                    }
                });
            if let Err(err) = spawned {
                log::error!("failed to spawn worker thread {index}: {err}");
            }
        }
        Self { queue: tx }
    }

    /// Process-wide default pool used by the async hooks when no executor
    /// is given.
    pub fn shared() -> &'static WorkerPool {
        static SHARED: OnceLock<WorkerPool> = OnceLock::new();
        SHARED.get_or_init(|| WorkerPool::new(2))
    }
}

impl Executor for WorkerPool {
    fn execute(&self, job: Job) {
        if self.queue.send(job).is_err() {
            log::error!("worker pool queue closed; dropping job");
        }
    }
}

/// Runs jobs on the calling thread. Deterministic hosts and tests use this
/// so async suppliers finish before the hook returns.
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, job: Job) {
        job();
    }
}
