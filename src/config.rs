use core::num::NonZeroUsize;
use std::thread;

/// Worker count used when the platform cannot report its parallelism.
const FALLBACK_WORKERS: NonZeroUsize = NonZeroUsize::new(2).expect("ManagerConfig: [1]");
const DEFAULT_THREAD_NAME: &str = "taskpool-worker";

/// Settings a [`Manager`](crate::manager::Manager) spawns its workers with.
///
/// The same configuration is reused for every epoch; a restart may only
/// change the worker count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Number of worker threads per epoch.
    pub workers: NonZeroUsize,
    /// Thread name prefix; workers are named `{thread_name}-{index}`.
    pub thread_name: String,
    /// Stack size of each worker thread, or the platform default.
    pub stack_size: Option<usize>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            stack_size: None,
        }
    }
}

impl ManagerConfig {
    /// Set the worker count. Zero is raised to a single worker.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = NonZeroUsize::new(workers).unwrap_or(NonZeroUsize::MIN);
        self
    }

    /// Set the worker thread name prefix.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// Set the stack size of worker threads in bytes.
    #[must_use]
    pub fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    pub(crate) fn worker_name(&self, index: usize) -> String {
        format!("{}-{index}", self.thread_name)
    }
}

/// Hardware parallelism as reported by the platform, or two workers.
#[must_use]
pub fn default_workers() -> NonZeroUsize {
    thread::available_parallelism().unwrap_or(FALLBACK_WORKERS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_detected_parallelism() {
        let config = ManagerConfig::default();
        assert_eq!(config.workers, default_workers());
        assert_eq!(config.thread_name, "taskpool-worker");
        assert!(config.stack_size.is_none());
    }

    #[test]
    fn zero_workers_is_raised_to_one() {
        let config = ManagerConfig::default().with_workers(0);
        assert_eq!(config.workers.get(), 1);
    }

    #[test]
    fn builder_sets_every_field() {
        let config = ManagerConfig::default()
            .with_workers(3)
            .with_thread_name("render")
            .with_stack_size(1 << 20);
        assert_eq!(config.workers.get(), 3);
        assert_eq!(config.worker_name(2), "render-2");
        assert_eq!(config.stack_size, Some(1 << 20));
    }
}
