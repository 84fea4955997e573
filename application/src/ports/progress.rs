//! Progress reporting port.
//!
//! [`ProgressReporter`] is an **output port** the presentation layer
//! implements to surface human-readable progress while a run is in
//! flight. It is purely observational: nothing the reporter does may
//! affect control flow, and implementations must be fast and must not
//! panic — the engine treats reporting as fire-and-forget.

/// Receives human-readable progress messages during a run.
pub trait ProgressReporter: Send + Sync {
    /// Called at every significant milestone with a short message.
    fn report(&self, _message: &str) {}
}

/// No-op implementation for when progress isn't needed
pub struct NoProgress;

impl ProgressReporter for NoProgress {}
