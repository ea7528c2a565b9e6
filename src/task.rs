mod dependents;

use crate::{
    manager::Manager,
    result::{ResultHandle, TaskError, channel},
    sync::{AtomicUsize, Mutex, Ordering},
    task::dependents::{Dependent, Dependents},
    types::{BoxError, Job},
    utils::panic_message,
};
use core::{fmt, mem};
use derive_more::Debug;
use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};
use tracing::{debug, trace};

/// A schedulable unit of work with optional dependencies.
///
/// `Task` is a shared handle: the caller, every dependency it was registered
/// with, and the ready queue may all hold clones. The body runs at most once,
/// however many times the task is submitted.
///
/// A task created with [`make_after`](Self::make_after) is submitted to its
/// manager automatically once all of its dependencies have executed, whether
/// they succeeded or failed. Submitting it directly before that is ignored.
#[derive(Clone)]
pub struct Task {
    inner: Arc<TaskInner>,
}

struct TaskInner {
    /// Wrapped body; taken on execution.
    action: Mutex<Option<Job>>,
    /// Unresolved dependency count, absent for tasks built without
    /// dependencies.
    pending: Option<AtomicUsize>,
    dependents: Mutex<Dependents>,
}

impl Drop for TaskInner {
    /// Tear down the unrun part of the graph below this task iteratively, so
    /// dropping the root of a long pending chain cannot overflow the stack.
    fn drop(&mut self) {
        let mut stack = match mem::replace(&mut *self.dependents.lock(), Dependents::Fired) {
            Dependents::Waiting(waiting) => waiting,
            Dependents::Fired => return,
        };
        while let Some(dependent) = stack.pop() {
            let Some(inner) = Arc::into_inner(dependent.task.inner) else {
                continue;
            };
            if let Dependents::Waiting(next) =
                mem::replace(&mut *inner.dependents.lock(), Dependents::Fired)
            {
                stack.extend(next);
            }
        }
    }
}

impl Task {
    /// Create a task without dependencies.
    ///
    /// A panic raised by `body` is captured into the result handle as
    /// [`TaskError::Panicked`].
    pub fn make<T, F>(body: F) -> TaskPair<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        Self::with_body(move || Ok(body()), None)
    }

    /// Create a task without dependencies from a fallible body. An `Err` is
    /// delivered as [`TaskError::Failed`].
    pub fn try_make<T, E, F>(body: F) -> TaskPair<T>
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: FnOnce() -> Result<T, E> + Send + 'static,
    {
        Self::with_body(
            move || body().map_err(|err| TaskError::Failed(err.into())),
            None,
        )
    }

    /// Create a task that runs on `manager` once every task in
    /// `dependencies` has executed. Dependencies may be given as [`Task`]s or
    /// [`TaskPair`]s, by value or by reference.
    ///
    /// All dependents of a task must be created before that task starts
    /// running to be notified in registration order; a dependency that has
    /// already executed counts as resolved immediately. With an empty
    /// dependency list the task is ready at once and must be pushed like any
    /// other.
    pub fn make_after<T, F, D>(body: F, manager: &Manager, dependencies: D) -> TaskPair<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
        D: IntoIterator<Item: AsRef<Task>>,
    {
        let dependencies: Vec<_> = dependencies.into_iter().collect();
        let pair = Self::with_body(move || Ok(body()), Some(dependencies.len()));
        pair.task.subscribe(manager, dependencies);
        pair
    }

    /// Fallible counterpart of [`make_after`](Self::make_after).
    pub fn try_make_after<T, E, F, D>(
        body: F,
        manager: &Manager,
        dependencies: D,
    ) -> TaskPair<T>
    where
        T: Send + 'static,
        E: Into<BoxError>,
        F: FnOnce() -> Result<T, E> + Send + 'static,
        D: IntoIterator<Item: AsRef<Task>>,
    {
        let dependencies: Vec<_> = dependencies.into_iter().collect();
        let pair = Self::with_body(
            move || body().map_err(|err| TaskError::Failed(err.into())),
            Some(dependencies.len()),
        );
        pair.task.subscribe(manager, dependencies);
        pair
    }

    fn with_body<T, F>(body: F, pending: Option<usize>) -> TaskPair<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, TaskError> + Send + 'static,
    {
        let (sender, result) = channel();
        let action: Job = Box::new(move || {
            let outcome = match panic::catch_unwind(AssertUnwindSafe(body)) {
                Ok(outcome) => outcome,
                Err(payload) => {
                    debug!(message = %panic_message(&*payload), "task body panicked");
                    Err(TaskError::from_panic(&*payload))
                }
            };
            sender.send(outcome);
        });
        let task = Self {
            inner: Arc::new(TaskInner {
                action: Mutex::new(Some(action)),
                pending: pending.map(AtomicUsize::new),
                dependents: Mutex::new(Dependents::default()),
            }),
        };
        TaskPair { task, result }
    }

    fn subscribe<D: AsRef<Task>>(&self, manager: &Manager, dependencies: Vec<D>) {
        let shared = manager.downgrade();
        for dependency in dependencies {
            dependency.as_ref().add_dependent(Dependent {
                task: self.clone(),
                manager: shared.clone(),
            });
        }
    }

    fn add_dependent(&self, dependent: Dependent) {
        let mut dependents = self.inner.dependents.lock();
        if let Dependents::Waiting(waiting) = &mut *dependents {
            waiting.push(dependent);
            return;
        }
        drop(dependents);
        trace!("dependency already executed; resolving immediately");
        dependent.resolve();
    }

    /// Number of dependencies that have not executed yet, or `None` for a
    /// task created without a dependency list.
    #[must_use]
    pub fn pending_dependencies(&self) -> Option<usize> {
        self.inner
            .pending
            .as_ref()
            .map(|counter| counter.load(Ordering::Acquire))
    }

    /// Whether the task may be submitted directly, i.e. it has no unresolved
    /// dependencies.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.pending_dependencies().is_none_or(|pending| pending == 0)
    }

    /// Whether a worker has already picked the body up.
    #[must_use]
    pub fn has_started(&self) -> bool {
        self.inner.action.lock().is_none()
    }

    pub(crate) fn into_job(self) -> Job {
        Box::new(move || self.run())
    }

    /// Execute the body, then notify dependents in registration order.
    fn run(&self) {
        let action = self.inner.action.lock().take();
        let Some(action) = action else {
            trace!("task already executed; ignoring duplicate submission");
            return;
        };
        action();

        let dependents = mem::replace(&mut *self.inner.dependents.lock(), Dependents::Fired);
        if let Dependents::Waiting(dependents) = dependents {
            for dependent in dependents {
                dependent.resolve();
            }
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("pending", &self.pending_dependencies())
            .finish_non_exhaustive()
    }
}

impl AsRef<Task> for Task {
    fn as_ref(&self) -> &Task {
        self
    }
}

/// A freshly created [`Task`] together with the handle to its result.
#[must_use = "a task does nothing until it is pushed to a manager"]
#[derive(Debug)]
pub struct TaskPair<T> {
    task: Task,
    result: ResultHandle<T>,
}

impl<T> TaskPair<T> {
    /// The task half, for pushing or for declaring it as a dependency.
    pub fn task(&self) -> &Task {
        &self.task
    }

    /// Keep only the task half, dropping the result handle.
    pub fn into_task(self) -> Task {
        self.task
    }

    /// Keep only the result half.
    pub fn into_result(self) -> ResultHandle<T> {
        self.result
    }

    /// Split into both halves.
    pub fn into_parts(self) -> (Task, ResultHandle<T>) {
        (self.task, self.result)
    }

    /// Block until the task has run and return its outcome.
    ///
    /// # Errors
    /// See [`ResultHandle::get`].
    pub fn result(self) -> Result<T, TaskError> {
        self.result.get()
    }
}

impl<T> AsRef<Task> for TaskPair<T> {
    fn as_ref(&self) -> &Task {
        &self.task
    }
}
