use crate::{
    manager::{Shared, state::Step},
    utils::panic_message,
};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Body of one worker thread for one epoch.
///
/// The worker pops ready jobs until the epoch ends: either the pool was
/// dropped (`Ended`) or a join was requested and nothing is left to run.
pub(super) fn run(shared: &Shared, index: usize) {
    debug!(worker = index, "worker started");
    loop {
        let job = {
            let mut state = shared.state.lock();
            loop {
                match state.next_step() {
                    Step::Run(job) => break job,
                    Step::Wait => state = shared.signal.wait(state),
                    Step::Finish => {
                        drop(state);
                        shared.signal.notify_all();
                        debug!(worker = index, "pool drained; epoch ended");
                        return;
                    }
                    Step::Exit => {
                        debug!(worker = index, "worker stopped");
                        return;
                    }
                }
            }
        };

        // Task bodies report their own failures; anything reaching this point
        // escaped a plain job and must not take the worker down.
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
            warn!(
                worker = index,
                message = %panic_message(&*payload),
                "job panicked outside of a task result"
            );
        }

        let drained = shared.state.lock().complete();
        if drained {
            shared.signal.notify_all();
        }
    }
}
