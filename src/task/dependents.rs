use crate::{manager::Shared, sync::Ordering, task::Task};
use std::sync::Weak;
use tracing::{debug, trace};

/// Notification list of a task: who to tell once it has executed.
#[derive(Debug)]
pub(super) enum Dependents {
    /// The task has not executed yet; registrations are queued here in order.
    Waiting(Vec<Dependent>),
    /// The task has executed and its list was drained. Late registrations
    /// resolve on the spot.
    Fired,
}

impl Default for Dependents {
    fn default() -> Self {
        Self::Waiting(Vec::new())
    }
}

/// One edge of the dependency graph, seen from the dependency's side.
#[derive(Debug)]
pub(super) struct Dependent {
    pub(super) task: Task,
    /// The pool the dependent is submitted to once ready. Weak so that
    /// pending graphs never keep a torn-down pool alive.
    pub(super) manager: Weak<Shared>,
}

impl Dependent {
    /// Record one completed dependency. The caller that brings the counter to
    /// zero is the only one that submits the task.
    pub(super) fn resolve(self) {
        let Self { task, manager } = self;
        let counter = task
            .inner
            .pending
            .as_ref()
            .expect("Dependent::resolve: [1]");
        // AcqRel: the last decrement observes every other dependency's writes,
        // and publishes them to whichever worker pops the dependent.
        let previous = counter.fetch_sub(1, Ordering::AcqRel);
        assert_ne!(previous, 0, "Dependent::resolve: [2]");
        if previous != 1 {
            trace!(remaining = previous - 1, "dependency resolved");
            return;
        }
        match manager.upgrade() {
            Some(shared) => {
                trace!("last dependency resolved; submitting dependent");
                shared.enqueue(task.into_job());
            }
            None => debug!("dependent became ready after its manager was dropped"),
        }
    }
}
