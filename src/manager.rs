mod state;
mod submission;
mod worker;

pub use crate::manager::{state::Phase, submission::Submission};
use crate::{
    config::ManagerConfig,
    manager::state::State,
    sync::{Condvar, JoinHandle, Mutex, spawn_worker},
    task::Task,
    types::Job,
};
use core::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, error, trace};

/// A fixed-size pool of worker threads consuming a shared FIFO ready queue.
///
/// Work enters the queue either through [`push`](Self::push) or, for tasks
/// created with [`Task::make_after`], automatically once their last
/// dependency has executed. The pool runs in epochs:
///
/// ```text
///   new / restart         join              last worker sees
///  ───────────────▶ Running ───▶ Joining ─────────────────────▶ Ended
///                      ▲                  queue empty, idle       │
///                      └──────────────── restart ─────────────────┘
/// ```
///
/// All operations are infallible. Work pushed after [`join`](Self::join)
/// stays queued until [`restart`](Self::restart); dropping the manager
/// discards it.
pub struct Manager {
    shared: Arc<Shared>,
    pool: Mutex<Pool>,
}

/// State shared between the manager, its workers, and pending dependents.
pub(crate) struct Shared {
    state: Mutex<State>,
    /// Signals new work as well as shutdown transitions.
    signal: Condvar,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: Mutex::new(State::new()),
            signal: Condvar::new(),
        }
    }

    /// Append a ready job and wake one idle worker.
    pub(crate) fn enqueue(&self, job: Job) {
        self.state.lock().push(job);
        self.signal.notify_one();
    }

    fn begin_join(&self) -> bool {
        let started = self.state.lock().begin_join();
        self.signal.notify_all();
        started
    }
}

struct Pool {
    config: ManagerConfig,
    handles: Vec<JoinHandle<()>>,
}

impl Pool {
    /// # Panics
    /// If the OS refuses to create a worker thread.
    fn spawn(&mut self, shared: &Arc<Shared>) {
        let workers = self.config.workers.get();
        self.handles.reserve(workers);
        for index in 0..workers {
            let shared = Arc::clone(shared);
            let handle = spawn_worker(
                self.config.worker_name(index),
                self.config.stack_size,
                move || worker::run(&shared, index),
            )
            .expect("Manager: failed to spawn worker thread");
            self.handles.push(handle);
        }
        debug!(workers, "worker pool started");
    }

    fn join_all(&mut self) {
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                error!("worker thread panicked");
            }
        }
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("Manager")
            .field("phase", &state.phase())
            .field("active", &state.active())
            .field("queued", &state.queued())
            .finish_non_exhaustive()
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Manager {
    /// Start a pool with one worker per available hardware thread, or two if
    /// that cannot be determined.
    ///
    /// # Panics
    /// If a worker thread cannot be spawned.
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    /// Start a pool with exactly `workers` threads (at least one).
    ///
    /// # Panics
    /// If a worker thread cannot be spawned.
    pub fn with_workers(workers: usize) -> Self {
        Self::with_config(ManagerConfig::default().with_workers(workers))
    }

    /// Start a pool from a full configuration.
    ///
    /// # Panics
    /// If a worker thread cannot be spawned.
    pub fn with_config(config: ManagerConfig) -> Self {
        let shared = Arc::new(Shared::new());
        let mut pool = Pool {
            config,
            handles: Vec::new(),
        };
        pool.spawn(&shared);
        Self {
            shared,
            pool: Mutex::new(pool),
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<Shared> {
        Arc::downgrade(&self.shared)
    }

    /// Submit work: a closure or [`Job`], a [`Task`], a
    /// [`TaskPair`](crate::task::TaskPair), or any tuple, array or vector of
    /// those.
    ///
    /// Tasks that still have unresolved dependencies are silently skipped;
    /// they are submitted by their last dependency instead.
    pub fn push<S: Submission>(&self, submission: S) {
        submission.submit(self);
    }

    /// Submit a plain closure.
    pub fn push_fn(&self, job: impl FnOnce() + Send + 'static) {
        self.push_job(Box::new(job));
    }

    /// Submit a plain job. Always enqueued.
    pub fn push_job(&self, job: Job) {
        trace!("job submitted");
        self.shared.enqueue(job);
    }

    /// Submit a task if it has no unresolved dependencies; otherwise do
    /// nothing.
    pub fn push_task(&self, task: &Task) {
        if !task.is_ready() {
            trace!(
                pending = task.pending_dependencies(),
                "ignoring task with unresolved dependencies"
            );
            return;
        }
        trace!("task submitted");
        self.shared.enqueue(task.clone().into_job());
    }

    /// Number of jobs currently executing.
    #[must_use]
    pub fn active_tasks(&self) -> usize {
        self.shared.state.lock().active()
    }

    /// Number of jobs waiting in the ready queue, excluding executing ones.
    #[must_use]
    pub fn remaining_tasks(&self) -> usize {
        self.shared.state.lock().queued()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.shared.state.lock().phase()
    }

    /// Worker count of the current (or, once joined, the last) epoch.
    ///
    /// Blocks while a join or restart is in progress.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.pool.lock().config.workers.get()
    }

    /// Discard every job still waiting in the ready queue and return how many
    /// were dropped. Executing jobs are unaffected.
    ///
    /// A discarded task's result resolves to
    /// [`TaskError::Abandoned`](crate::result::TaskError::Abandoned) once its
    /// last [`Task`] handle is dropped. Its dependents are never notified, so
    /// they never become ready.
    pub fn clear_tasks(&self) -> usize {
        let cleared = self.shared.state.lock().take_queue();
        let count = cleared.len();
        drop(cleared);
        debug!(count, "ready queue cleared");
        count
    }

    /// Let the workers drain the ready queue, then stop them. Blocks until
    /// every worker has exited.
    ///
    /// Must not be called from inside a job: the calling worker would wait
    /// for itself.
    pub fn join(&self) {
        let mut pool = self.pool.lock();
        if self.shared.begin_join() {
            debug!("joining worker pool");
        }
        pool.join_all();
        debug!(phase = ?self.phase(), "worker pool joined");
    }

    /// Start a new epoch with the previous worker count, joining the current
    /// one first if it is still running.
    ///
    /// # Panics
    /// If a worker thread cannot be spawned.
    pub fn restart(&self) {
        self.restart_inner(None);
    }

    /// Start a new epoch with `workers` threads (at least one), joining the
    /// current one first if it is still running.
    ///
    /// # Panics
    /// If a worker thread cannot be spawned.
    pub fn restart_with(&self, workers: usize) {
        self.restart_inner(Some(workers));
    }

    fn restart_inner(&self, workers: Option<usize>) {
        let mut pool = self.pool.lock();
        if self.shared.begin_join() {
            debug!("restart requested while running; joining first");
        }
        pool.join_all();
        if let Some(workers) = workers {
            pool.config = pool.config.clone().with_workers(workers);
        }
        self.shared.state.lock().begin_epoch();
        debug!("restarting worker pool");
        pool.spawn(&self.shared);
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        let abandoned = self.shared.state.lock().shut_down();
        self.shared.signal.notify_all();
        let mut count = abandoned.len();
        drop(abandoned);

        self.pool.lock().join_all();

        // Dependents of jobs that were still executing may have landed after
        // the first sweep.
        let late = self.shared.state.lock().take_queue();
        count += late.len();
        drop(late);
        debug!(abandoned = count, "manager dropped");
    }
}
