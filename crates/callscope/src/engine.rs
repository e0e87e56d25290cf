//! Measurement-engine collaborator traits.
//!
//! The core never measures anything itself. It asks a [`MeasurementEngine`]
//! for one opaque [`MeasurementHandle`] per instrumented call and brackets
//! the call's lifetime with `start()`/`stop()`. What the handle actually
//! records (wall time, memory, counters) is the engine's business.

use thiserror::Error;

/// Errors a measurement engine may report.
///
/// The dispatcher swallows all of these; a failing handle costs one
/// measurement, never the host program.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The handle was started twice.
    #[error("measurement was already started")]
    AlreadyStarted,

    /// The handle was stopped without being started.
    #[error("measurement was never started")]
    NotStarted,

    /// The requested component kind is not provided by this engine.
    #[error("unsupported component: {0}")]
    UnsupportedComponent(String),

    /// The backing facility is unavailable.
    #[error("measurement backend unavailable: {0}")]
    Backend(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// One open measurement interval.
///
/// A handle is owned exclusively by the measurement-stack slot that holds it
/// between `start()` and `stop()`; it is never aliased.
pub trait MeasurementHandle {
    /// Begin the interval.
    fn start(&mut self) -> Result<()>;

    /// End the interval and record whatever was measured.
    fn stop(&mut self) -> Result<()>;
}

/// Factory and lifecycle surface of the measurement collaborator.
pub trait MeasurementEngine {
    /// Handle type produced by [`MeasurementEngine::create`].
    type Handle: MeasurementHandle;

    /// Apply the requested component list and aggregation modes. Called once
    /// per activation, after [`MeasurementEngine::reset`].
    fn configure(&mut self, components: &[String], flat: bool, timeline: bool);

    /// Discard all recorded data.
    fn reset(&mut self);

    /// Create a handle for one call. Missing metadata arrives as an empty
    /// file and line 0.
    fn create(&mut self, function: &str, file: &str, line: u32) -> Result<Self::Handle>;
}
