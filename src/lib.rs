//! In-process task pool with one-shot dependency graphs.
//!
//! This crate runs units of work on a fixed set of worker threads. It:
//! - Executes tasks from a single FIFO ready queue shared by all workers.
//! - Lets a task declare dependencies on earlier tasks; it is submitted
//!   automatically once the last of them has executed, and never before.
//! - Delivers each task's typed outcome, or the failure it raised, through a
//!   one-shot result handle.
//!
//! Key modules:
//! - `task`: the `Task` handle and its factories; dependency registration and
//!   the notification protocol.
//! - `manager`: the worker pool, its ready queue, and the
//!   `Running`/`Joining`/`Ended` epoch lifecycle.
//! - `result`: the result handle and the `TaskError` it may carry.
//! - `config`: worker count, thread naming and stack size.
//!
//! Quick start:
//! 1. Create a `Manager`.
//! 2. Build root tasks with `Task::make`, dependents with `Task::make_after`.
//! 3. Push the roots; dependents follow on their own.
//! 4. Consume results with `TaskPair::result` or `ResultHandle::get`.
//!
//! ```
//! use taskpool::{manager::Manager, task::Task};
//!
//! let manager = Manager::with_workers(2);
//! let a = Task::make(|| 20);
//! let b = Task::make(|| 22);
//! let done = Task::make_after(|| "sum ready", &manager, [a.task(), b.task()]);
//! let (a_task, a) = a.into_parts();
//! let (b_task, b) = b.into_parts();
//! manager.push((a_task, b_task));
//!
//! assert_eq!(a.get().unwrap() + b.get().unwrap(), 42);
//! assert_eq!(done.result().unwrap(), "sum ready");
//! ```
//!
//! Dependency resolution is decided when a dependent is created: each
//! dependency records the dependent in its notification list, and the
//! dependent carries an atomic count of dependencies still outstanding. A
//! dependency that fails still notifies its dependents; failures are only
//! visible through the failing task's own result.

/// Worker pool configuration.
pub mod config;
/// The worker pool.
///
/// Owns the worker threads and the ready queue, resolves submissions into
/// queued jobs, and drives the epoch lifecycle (`join`, `restart`, teardown).
pub mod manager;
/// One-shot result handles and task failures.
pub mod result;
mod sync;
/// Tasks, their factories, and dependency bookkeeping.
///
/// Defines `Task` (a shared handle to a schedulable body with an optional
/// dependency counter) and `TaskPair` (a new task plus its result handle).
pub mod task;
/// Common aliases used across the crate.
pub mod types;
mod utils;
