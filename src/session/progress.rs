use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Cooperative cancellation flag, polled once per frame.
#[derive(Debug, Default)]
struct CancelToken(AtomicBool);

impl CancelToken {
    fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Finalization progress in percent plus its cancellation token.
///
/// Written by the finalizing thread, read (and cancelled) from anywhere.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    percent_bits: AtomicU64,
    cancel: CancelToken,
}

/// Shared handle to a tier's [`ProgressTracker`].
pub type ProgressHandle = Arc<ProgressTracker>;

impl ProgressTracker {
    pub fn new_handle() -> ProgressHandle {
        Arc::new(Self::default())
    }

    pub fn percent(&self) -> f64 {
        f64::from_bits(self.percent_bits.load(Ordering::Acquire))
    }

    /// Store `percent`, clamped to `[0, 100]`.
    pub fn set(&self, percent: f64) {
        let v = percent.clamp(0.0, 100.0);
        self.percent_bits.store(v.to_bits(), Ordering::Release);
    }

    /// Single-writer increment.
    pub fn advance(&self, delta: f64) {
        self.set(self.percent() + delta);
    }

    pub fn request_cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Back to 0% with no pending cancellation.
    pub fn reset(&self) {
        self.set(0.0);
        self.cancel.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/progress.rs"]
mod tests;
