use crate::types::Job;
use core::mem;
use derive_more::Debug;
use std::collections::VecDeque;

/// Lifecycle phase of a [`Manager`](crate::manager::Manager) epoch.
///
/// Transitions:
/// - Running -> Joining (`join`, or `restart` while running)
/// - Joining -> Ended (last worker finds the queue empty and nothing active)
/// - Running | Joining -> Ended (manager dropped)
/// - Ended -> Running (`restart`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Workers are running and pick up submitted work.
    Running,
    /// A join was requested; workers drain the queue, then stop.
    Joining,
    /// Every worker has stopped, or is about to. Submissions stay queued
    /// until the next restart.
    Ended,
}

/// What a worker does next, decided under the state lock.
pub(super) enum Step {
    Run(Job),
    Wait,
    /// The pool is drained while joining; this worker ended the epoch and must
    /// wake its peers.
    Finish,
    Exit,
}

/// Everything guarded by the manager's single lock.
#[derive(Debug)]
pub(super) struct State {
    phase: Phase,
    #[debug(skip)]
    queue: VecDeque<Job>,
    active: usize,
}

impl State {
    pub(super) fn new() -> Self {
        Self {
            phase: Phase::Running,
            queue: VecDeque::new(),
            active: 0,
        }
    }

    pub(super) fn phase(&self) -> Phase {
        self.phase
    }

    pub(super) fn active(&self) -> usize {
        self.active
    }

    pub(super) fn queued(&self) -> usize {
        self.queue.len()
    }

    pub(super) fn push(&mut self, job: Job) {
        self.queue.push_back(job);
    }

    pub(super) fn take_queue(&mut self) -> VecDeque<Job> {
        mem::take(&mut self.queue)
    }

    fn is_drained(&self) -> bool {
        self.queue.is_empty() && self.active == 0
    }

    pub(super) fn next_step(&mut self) -> Step {
        match self.phase {
            Phase::Ended => Step::Exit,
            Phase::Joining if self.is_drained() => {
                self.phase = Phase::Ended;
                Step::Finish
            }
            Phase::Running | Phase::Joining => match self.queue.pop_front() {
                Some(job) => {
                    self.active += 1;
                    Step::Run(job)
                }
                None => Step::Wait,
            },
        }
    }

    /// Account for a finished job. Returns `true` if idle workers waiting for
    /// the drain must be woken.
    pub(super) fn complete(&mut self) -> bool {
        self.active = self.active.checked_sub(1).expect("State::complete: [1]");
        self.phase == Phase::Joining && self.is_drained()
    }

    /// `Running -> Joining`. Returns whether the transition happened.
    pub(super) fn begin_join(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.phase = Phase::Joining;
        true
    }

    /// Force `Ended` and hand back whatever was still queued.
    pub(super) fn shut_down(&mut self) -> VecDeque<Job> {
        self.phase = Phase::Ended;
        self.take_queue()
    }

    /// Start a new epoch once the previous worker set is gone.
    pub(super) fn begin_epoch(&mut self) {
        self.phase = Phase::Running;
    }
}
