//! Scheduling contract.
//!
//! The engine never touches the wall clock itself. Everything that must
//! run later, or repeatedly, or on the UI thread from somewhere else, goes
//! through a [`Scheduler`]: platform adapters wrap their tick loop in one,
//! and [`StepScheduler`] is a deterministic implementation for tests,
//! demos, and headless hosts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

/// One-shot unit of work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Work invoked on every interval tick until cancelled.
pub type RepeatingJob = Box<dyn FnMut() + Send + 'static>;

/// Defers work onto the thread that owns the UI.
///
/// `run` must execute the job on the UI thread as soon as possible;
/// `run_later` and `run_repeating` after the given delay or on the given
/// interval. The returned handles are how sessions cancel outstanding work
/// on unmount.
pub trait Scheduler: Send + Sync {
    fn run(&self, job: Job) -> TaskHandle;
    fn run_later(&self, job: Job, delay: Duration) -> TaskHandle;
    fn run_repeating(&self, job: RepeatingJob, interval: Duration) -> TaskHandle;
}

#[derive(Default)]
struct HandleState {
    cancelled: AtomicBool,
    complete: AtomicBool,
}

/// Cancellation handle for scheduled work.
///
/// Cancelling is idempotent and silently does nothing for work that
/// already ran. Handles compare and hash by identity so a session can keep
/// them in a set.
#[derive(Clone, Default)]
pub struct TaskHandle {
    state: Arc<HandleState>,
}

impl TaskHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// For scheduler implementations: flag a one-shot job as having run.
    pub fn mark_complete(&self) {
        self.state.complete.store(true, Ordering::SeqCst);
    }

    pub fn is_complete(&self) -> bool {
        self.state.complete.load(Ordering::SeqCst)
    }
}

impl PartialEq for TaskHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl Eq for TaskHandle {}

impl std::hash::Hash for TaskHandle {
    fn hash<H: std::hash::Hasher>(&self, hasher: &mut H) {
        (Arc::as_ptr(&self.state) as usize).hash(hasher);
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("cancelled", &self.is_cancelled())
            .field("complete", &self.is_complete())
            .finish()
    }
}

new_key_type! {
    struct TaskKey;
}

enum JobKind {
    /// The option is taken while the job runs.
    Once(Option<Job>),
    Repeating {
        job: Option<RepeatingJob>,
        every: Duration,
    },
}

struct Pending {
    due: Duration,
    seq: u64,
    job: JobKind,
    handle: TaskHandle,
}

struct StepInner {
    now: Duration,
    seq: u64,
    tasks: SlotMap<TaskKey, Pending>,
}

/// A [`Scheduler`] driven by hand.
///
/// Time is virtual: `step` runs everything already due, `advance` moves the
/// clock forward and fires whatever became due, repeating jobs as many
/// times as their interval elapsed. Ties fire in submission order.
pub struct StepScheduler {
    inner: Mutex<StepInner>,
}

impl Default for StepScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl StepScheduler {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StepInner {
                now: Duration::ZERO,
                seq: 0,
                tasks: SlotMap::with_key(),
            }),
        }
    }

    /// Number of live (not yet cancelled) pending tasks.
    pub fn pending(&self) -> usize {
        let inner = self.inner.lock();
        inner
            .tasks
            .values()
            .filter(|p| !p.handle.is_cancelled())
            .count()
    }

    /// Runs every task due at the current virtual time. Returns how many
    /// jobs fired.
    pub fn step(&self) -> usize {
        self.fire_due()
    }

    /// Moves the virtual clock forward and fires everything that became
    /// due on the way.
    pub fn advance(&self, delta: Duration) -> usize {
        self.inner.lock().now += delta;
        self.fire_due()
    }

    fn insert(&self, due_in: Duration, job: JobKind) -> TaskHandle {
        let handle = TaskHandle::new();
        let mut inner = self.inner.lock();
        let due = inner.now + due_in;
        let seq = inner.seq;
        inner.seq += 1;
        inner.tasks.insert(Pending {
            due,
            seq,
            job,
            handle: handle.clone(),
        });
        handle
    }

    fn fire_due(&self) -> usize {
        enum Run {
            Once(Job, TaskHandle),
            Repeat(RepeatingJob, TaskKey, TaskHandle, Duration),
        }

        let mut fired = 0;
        loop {
            let run = {
                let mut inner = self.inner.lock();
                inner.tasks.retain(|_, p| !p.handle.is_cancelled());
                let now = inner.now;
                let key = inner
                    .tasks
                    .iter()
                    .filter(|(_, p)| p.due <= now)
                    .min_by_key(|(_, p)| (p.due, p.seq))
                    .map(|(k, _)| k);
                let Some(key) = key else { break };
                match &mut inner.tasks[key].job {
                    JobKind::Once(slot) => {
                        let job = slot.take();
                        let handle = inner.tasks[key].handle.clone();
                        inner.tasks.remove(key);
                        match job {
                            Some(job) => Run::Once(job, handle),
                            None => continue,
                        }
                    }
                    JobKind::Repeating { job, every } => {
                        let every = *every;
                        let Some(job) = job.take() else {
                            // Already running on another thread; leave it.
                            break;
                        };
                        let pending = &mut inner.tasks[key];
                        pending.due += every;
                        Run::Repeat(job, key, pending.handle.clone(), every)
                    }
                }
            };

            // Jobs run unlocked so they may schedule more work.
            match run {
                Run::Once(job, handle) => {
                    job();
                    handle.mark_complete();
                }
                Run::Repeat(mut job, key, handle, every) => {
                    job();
                    let mut inner = self.inner.lock();
                    if handle.is_cancelled() {
                        inner.tasks.remove(key);
                    } else if let Some(pending) = inner.tasks.get_mut(key) {
                        pending.job = JobKind::Repeating {
                            job: Some(job),
                            every,
                        };
                    }
                }
            }
            fired += 1;
        }
        fired
    }
}

impl Scheduler for StepScheduler {
    fn run(&self, job: Job) -> TaskHandle {
        self.insert(Duration::ZERO, JobKind::Once(Some(job)))
    }

    fn run_later(&self, job: Job, delay: Duration) -> TaskHandle {
        self.insert(delay, JobKind::Once(Some(job)))
    }

    fn run_repeating(&self, job: RepeatingJob, interval: Duration) -> TaskHandle {
        self.insert(
            interval,
            JobKind::Repeating {
                job: Some(job),
                every: interval,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> usize) {
        let count = Arc::new(AtomicUsize::new(0));
        let reader = {
            let count = count.clone();
            move || count.load(Ordering::SeqCst)
        };
        (count, reader)
    }

    #[test]
    fn run_fires_on_step_in_order() {
        let scheduler = StepScheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for tag in ["a", "b", "c"] {
            let log = log.clone();
            scheduler.run(Box::new(move || log.lock().push(tag)));
        }
        assert_eq!(scheduler.step(), 3);
        assert_eq!(*log.lock(), vec!["a", "b", "c"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn run_later_waits_for_the_clock() {
        let scheduler = StepScheduler::new();
        let (count, read) = counter();
        let handle = scheduler.run_later(
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
            Duration::from_millis(50),
        );
        assert_eq!(scheduler.step(), 0);
        assert_eq!(scheduler.advance(Duration::from_millis(49)), 0);
        assert_eq!(scheduler.advance(Duration::from_millis(1)), 1);
        assert_eq!(read(), 1);
        assert!(handle.is_complete());
    }

    #[test]
    fn repeating_fires_per_elapsed_interval() {
        let scheduler = StepScheduler::new();
        let (count, read) = counter();
        let handle = scheduler.run_repeating(
            Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }),
            Duration::from_secs(1),
        );
        scheduler.advance(Duration::from_secs(3));
        assert_eq!(read(), 3);

        handle.cancel();
        handle.cancel();
        scheduler.advance(Duration::from_secs(5));
        assert_eq!(read(), 3);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn cancelled_before_due_never_fires() {
        let scheduler = StepScheduler::new();
        let (count, read) = counter();
        let handle = scheduler.run(Box::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
        }));
        handle.cancel();
        assert_eq!(scheduler.step(), 0);
        assert_eq!(read(), 0);
    }

    #[test]
    fn jobs_may_schedule_jobs() {
        let scheduler = Arc::new(StepScheduler::new());
        let (count, read) = counter();
        let inner_scheduler = scheduler.clone();
        let inner_count = count.clone();
        scheduler.run(Box::new(move || {
            inner_count.fetch_add(1, Ordering::SeqCst);
            let count = inner_count.clone();
            inner_scheduler.run(Box::new(move || {
                count.fetch_add(1, Ordering::SeqCst);
            }));
        }));
        assert_eq!(scheduler.step(), 2);
        assert_eq!(read(), 2);
    }
}
