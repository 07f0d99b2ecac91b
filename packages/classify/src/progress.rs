//! Progress reporting seam.
//!
//! Long stages (tract classification, raster scanlines) take a
//! [`ProgressCallback`] instead of a concrete bar type, so binaries can
//! plug in `indicatif` while library callers and tests stay silent.

use std::sync::Arc;

/// Receiver for progress updates from a long-running stage.
///
/// `Send + Sync` so one callback can be shared across pipeline stages
/// behind an [`Arc`].
pub trait ProgressCallback: Send + Sync {
    /// Declares the total units of work once the stage knows it.
    fn set_total(&self, total: u64);

    /// Advances by `delta` units.
    fn inc(&self, delta: u64);

    /// Replaces the status message.
    fn set_message(&self, msg: String);

    /// Completes with a final message.
    fn finish(&self, msg: String);

    /// Completes and removes the indicator.
    fn finish_and_clear(&self);
}

/// Discards every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

/// A shared [`NullProgress`] for callers that do not report progress.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
