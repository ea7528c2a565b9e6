mod error;

pub use crate::result::error::TaskError;
use crate::sync::{Condvar, Mutex};
use derive_more::Debug;
use std::sync::Arc;

/// Create a connected one-shot sender/handle pair.
pub(crate) fn channel<T>() -> (ResultSender<T>, ResultHandle<T>) {
    let slot = Arc::new(Slot {
        outcome: Mutex::new(None),
        resolved: Condvar::new(),
    });
    (
        ResultSender {
            slot: Some(slot.clone()),
        },
        ResultHandle { slot },
    )
}

struct Slot<T> {
    outcome: Mutex<Option<Result<T, TaskError>>>,
    resolved: Condvar,
}

impl<T> Slot<T> {
    fn resolve(&self, outcome: Result<T, TaskError>) {
        let mut slot = self.outcome.lock();
        *slot = Some(outcome);
        drop(slot);
        self.resolved.notify_all();
    }
}

/// Producer half of the result channel, owned by the task's job.
///
/// Dropping it unsent resolves the handle with [`TaskError::Abandoned`], so a
/// consumer never waits on a task that can no longer run.
pub(crate) struct ResultSender<T> {
    slot: Option<Arc<Slot<T>>>,
}

impl<T> ResultSender<T> {
    pub(crate) fn send(mut self, outcome: Result<T, TaskError>) {
        if let Some(slot) = self.slot.take() {
            slot.resolve(outcome);
        }
    }
}

impl<T> Drop for ResultSender<T> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            slot.resolve(Err(TaskError::Abandoned));
        }
    }
}

/// Consumer half of the result channel: the eventual outcome of one task.
///
/// The handle is consumed by [`get`](Self::get), so a result can be taken at
/// most once.
#[must_use = "a result handle does nothing unless its outcome is consumed"]
#[derive(Debug)]
pub struct ResultHandle<T> {
    #[debug(skip)]
    slot: Arc<Slot<T>>,
}

impl<T> ResultHandle<T> {
    /// Block until the task has produced its outcome and return it.
    ///
    /// There is no timeout. Calling this from inside a task body ties up a
    /// worker; if every worker does so the pool stalls.
    ///
    /// # Errors
    /// Returns the [`TaskError`] captured while running the task, or
    /// [`TaskError::Abandoned`] if the task was discarded without running.
    pub fn get(self) -> Result<T, TaskError> {
        let mut outcome = self.slot.outcome.lock();
        loop {
            if let Some(outcome) = outcome.take() {
                return outcome;
            }
            outcome = self.slot.resolved.wait(outcome);
        }
    }

    /// Whether [`get`](Self::get) would return without blocking.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.slot.outcome.lock().is_some()
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::{TaskError, channel};
    use std::thread;

    #[test]
    fn value_crosses_threads() {
        let (sender, handle) = channel();
        assert!(!handle.is_ready());
        thread::spawn(move || sender.send(Ok(42))).join().unwrap();
        assert!(handle.is_ready());
        assert_eq!(handle.get().unwrap(), 42);
    }

    #[test]
    fn dropped_sender_abandons() {
        let (sender, handle) = channel::<()>();
        drop(sender);
        assert!(matches!(handle.get(), Err(TaskError::Abandoned)));
    }

    #[test]
    fn failure_is_delivered() {
        let (sender, handle) = channel::<u8>();
        sender.send(Err(TaskError::Panicked {
            message: "boom".into(),
        }));
        let err = handle.get().unwrap_err();
        assert!(err.is_body_failure());
        assert_eq!(err.to_string(), "task body panicked: boom");
    }
}
