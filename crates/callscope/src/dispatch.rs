//! The event hook dispatcher.
//!
//! One dispatcher handles every call/return event the host delivers for one
//! call stack. It resolves event metadata per the settings, runs the frame
//! filter, keeps the sequence counter / skip ledger / measurement stack in
//! step, and delegates interval bracketing to the measurement engine.
//!
//! Nothing in here may panic or propagate an error into the host's call
//! machinery: engine failures cost the affected measurement and are logged
//! at debug level, nothing more.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::engine::{MeasurementEngine, MeasurementHandle};
use crate::events::{CallEvent, EventKind};
use crate::filter::{self, Decision, SkipReason};
use crate::runtime::ProfilerRuntime;
use crate::settings::Settings;

/// Per-call-stack event handler composed of filter, runtime, and engine.
pub struct Dispatcher<E: MeasurementEngine> {
    engine: E,
    runtime: ProfilerRuntime<E::Handle>,
    settings: Arc<Settings>,
    active: Arc<AtomicBool>,
    own_source: String,
}

impl<E: MeasurementEngine> Dispatcher<E> {
    /// Create a dispatcher.
    ///
    /// `active` is the controller's activity flag; `own_source` is the file
    /// identity under which the instrumentation itself appears to the host,
    /// so it never measures its own frames.
    pub fn new(
        engine: E,
        settings: Arc<Settings>,
        active: Arc<AtomicBool>,
        own_source: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            runtime: ProfilerRuntime::new(),
            settings,
            active,
            own_source: own_source.into(),
        }
    }

    /// Handle one event.
    pub fn dispatch(&mut self, event: &CallEvent) {
        match event.kind {
            EventKind::Enter => self.on_enter(event),
            EventKind::Exit => self.on_exit(),
        }
    }

    fn on_enter(&mut self, event: &CallEvent) {
        // Snapshot the id before any filtering or counter movement.
        let id = self.runtime.sequence();

        let line = if self.settings.capture_lines() {
            event.line.unwrap_or(0)
        } else {
            0
        };
        let raw_file = event.file.as_deref().unwrap_or("");
        let file = if self.settings.full_paths() {
            raw_file
        } else {
            filter::basename(raw_file)
        };

        let decision = filter::decide(
            self.active.load(Ordering::Relaxed),
            self.settings.enabled(),
            &event.function,
            file,
            &self.own_source,
        );

        match decision {
            // The catch-all skip branch advances the counter; the earlier
            // skip branches do not. Kept as observed, see runtime::advance.
            Decision::Skip(SkipReason::InitializerPattern) => {
                self.runtime.record_skip(id);
                self.runtime.advance();
            }
            Decision::Skip(_) => {
                self.runtime.record_skip(id);
            }
            Decision::Instrument => match self.open_measurement(&event.function, file, line) {
                Some(handle) => {
                    self.runtime.advance();
                    self.runtime.push(handle);
                }
                // Degrade the call to a skip so Exit pairing stays intact.
                None => self.runtime.record_skip(id),
            },
        }
    }

    fn on_exit(&mut self) {
        // Same snapshot convention as Enter: read before mutating.
        let id = self.runtime.sequence();

        if self.runtime.resolve_skip(id) {
            // The call was never measured.
        } else if let Some(mut handle) = self.runtime.pop() {
            if let Err(err) = handle.stop() {
                tracing::debug!("measurement stop failed: {err}");
            }
        }
        // No ledger entry and an empty stack is a pairing anomaly; it is a
        // no-op apart from the unconditional decrement below.

        self.runtime.retreat();
    }

    fn open_measurement(&mut self, function: &str, file: &str, line: u32) -> Option<E::Handle> {
        match self.engine.create(function, file, line) {
            Ok(mut handle) => match handle.start() {
                Ok(()) => Some(handle),
                Err(err) => {
                    tracing::debug!("measurement start failed for {function}: {err}");
                    None
                }
            },
            Err(err) => {
                tracing::debug!("measurement create failed for {function}: {err}");
                None
            }
        }
    }

    /// The per-call-stack runtime, for inspection.
    #[must_use]
    pub fn runtime(&self) -> &ProfilerRuntime<E::Handle> {
        &self.runtime
    }

    /// The measurement engine.
    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable access to the measurement engine (configure/reset).
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }
}

impl<E: MeasurementEngine> std::fmt::Debug for Dispatcher<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("depth", &self.runtime.depth())
            .field("open_skips", &self.runtime.open_skips())
            .field("own_source", &self.own_source)
            .finish_non_exhaustive()
    }
}
