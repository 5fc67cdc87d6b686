use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// @module: Cooperative cancellation for the batch pipeline

/// Cancellation flag shared between the signal handler and the pipeline.
///
/// Stages poll the flag between work items: the item in flight is allowed
/// to finish or time out naturally, then the stage loop stops and every
/// later stage runs over the partial results. Cancellation is not an
/// error; it produces a truncated but valid result set.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    inner: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag {
            inner: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. Idempotent, callable from any thread.
    pub fn trigger(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }
}
