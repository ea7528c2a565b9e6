use crate::{types::BoxError, utils::panic_message};
use core::any::Any;
use thiserror::Error;

/// Failure delivered through a [`ResultHandle`](crate::result::ResultHandle)
/// instead of a value.
///
/// A failing task never takes its worker down and never stops its dependents
/// from running; the failure is only observable by whoever consumes the
/// result.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TaskError {
    /// The task body panicked.
    #[error("task body panicked: {message}")]
    Panicked {
        /// Message carried by the panic payload, if it was a string.
        message: String,
    },
    /// A fallible task body returned an error.
    #[error("task body failed: {0}")]
    Failed(#[source] BoxError),
    /// The task was dropped before it ran: its job was cleared from the ready
    /// queue, discarded by pool teardown, or its manager was gone by the time
    /// the task became ready.
    #[error("task was dropped before it ran")]
    Abandoned,
}

impl TaskError {
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        Self::Panicked {
            message: panic_message(payload),
        }
    }

    /// Returns `true` if the task body actually ran and failed, as opposed to
    /// never running at all.
    #[must_use]
    pub fn is_body_failure(&self) -> bool {
        matches!(self, Self::Panicked { .. } | Self::Failed(_))
    }
}
