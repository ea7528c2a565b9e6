use core::error::Error;

/// A type-erased unit of work as it sits in the ready queue.
///
/// Dependency bookkeeping is resolved before a job is built, so workers only
/// ever see plain zero-argument closures.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Boxed error produced by a fallible task body.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;
