use crate::{
    manager::Manager,
    task::{Task, TaskPair},
};

/// Anything [`Manager::push`] accepts.
///
/// Implemented for plain closures (including boxed [`Job`](crate::types::Job)s),
/// tasks, task/result pairs, and for tuples,
/// arrays and vectors of those, so one `push` call can submit any mix. Parts
/// are submitted left to right.
pub trait Submission {
    /// Hand this submission to `manager`.
    fn submit(self, manager: &Manager);
}

impl<F: FnOnce() + Send + 'static> Submission for F {
    fn submit(self, manager: &Manager) {
        manager.push_fn(self);
    }
}

impl Submission for Task {
    fn submit(self, manager: &Manager) {
        manager.push_task(&self);
    }
}

impl Submission for &Task {
    fn submit(self, manager: &Manager) {
        manager.push_task(self);
    }
}

impl<T> Submission for TaskPair<T> {
    fn submit(self, manager: &Manager) {
        manager.push_task(self.task());
    }
}

impl<T> Submission for &TaskPair<T> {
    fn submit(self, manager: &Manager) {
        manager.push_task(self.task());
    }
}

impl<S: Submission> Submission for Vec<S> {
    fn submit(self, manager: &Manager) {
        for submission in self {
            submission.submit(manager);
        }
    }
}

impl<S: Submission, const N: usize> Submission for [S; N] {
    fn submit(self, manager: &Manager) {
        for submission in self {
            submission.submit(manager);
        }
    }
}

macro_rules! impl_submission_for_tuple {
    ($($part:ident),+) => {
        impl<$($part: Submission),+> Submission for ($($part,)+) {
            #[allow(non_snake_case)]
            fn submit(self, manager: &Manager) {
                let ($($part,)+) = self;
                $($part.submit(manager);)+
            }
        }
    };
}

impl_submission_for_tuple!(A);
impl_submission_for_tuple!(A, B);
impl_submission_for_tuple!(A, B, C);
impl_submission_for_tuple!(A, B, C, D);
impl_submission_for_tuple!(A, B, C, D, E);
impl_submission_for_tuple!(A, B, C, D, E, F);
impl_submission_for_tuple!(A, B, C, D, E, F, G);
impl_submission_for_tuple!(A, B, C, D, E, F, G, H);
