//! Lifecycle controller: owns activation state and the bracketing surfaces.
//!
//! A [`Profiler`] goes Idle → Active → Idle and is reusable. At most one
//! instance is Active process-wide: a second instance constructed while one
//! is Active is permanently inert and all of its bracketing operations are
//! no-ops. The four public bracketing surfaces (manual start/stop, function
//! wrapping, RAII scope, whole-program run) are thin adapters over one
//! internal guard-based helper, so teardown is guaranteed on every exit
//! path, unwinding included.

use std::panic::{self, AssertUnwindSafe, UnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::components;
use crate::dispatch::Dispatcher;
use crate::engine::MeasurementEngine;
use crate::settings::Settings;
use crate::source::{CallEventSource, EventHandler};

/// Process-wide flag: whether any profiler instance is currently Active.
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Evaluate an activation predicate with the strict three-way check:
/// only a clean `true` activates; `false` and a panicking predicate both
/// refuse activation.
fn predicate_allows<P>(predicate: P) -> bool
where
    P: FnOnce() -> bool + UnwindSafe,
{
    matches!(panic::catch_unwind(predicate), Ok(true))
}

/// Construction parameters for a [`Profiler`].
#[derive(Debug, Clone, Default)]
pub struct ProfilerConfig {
    /// Explicitly requested measurement components; concatenated with the
    /// environment list, see [`crate::components::resolve`].
    pub components: Vec<String>,
    /// Request flat aggregation regardless of the settings flag.
    pub flat: bool,
    /// Request timeline aggregation regardless of the settings flag.
    pub timeline: bool,
    /// File identity under which the instrumentation appears to the host.
    pub own_source: String,
}

/// The lifecycle controller.
pub struct Profiler<E: MeasurementEngine, S: CallEventSource> {
    dispatcher: Arc<Mutex<Dispatcher<E>>>,
    source: Arc<Mutex<S>>,
    settings: Arc<Settings>,
    components: Vec<String>,
    flat: bool,
    timeline: bool,
    is_active: Arc<AtomicBool>,
    should_activate: bool,
    activated: bool,
    previous: Option<EventHandler>,
}

impl<E, S> Profiler<E, S>
where
    E: MeasurementEngine + Send + 'static,
    E::Handle: Send,
    S: CallEventSource,
{
    /// Create a controller with the default always-true activation
    /// predicate.
    pub fn new(
        engine: E,
        source: Arc<Mutex<S>>,
        settings: Arc<Settings>,
        config: ProfilerConfig,
    ) -> Self {
        Self::with_predicate(engine, source, settings, config, || true)
    }

    /// Create a controller, consulting `predicate` once.
    ///
    /// `should_activate` is decided here and never revisited: no other
    /// instance may be Active and the predicate must answer a clean `true`.
    pub fn with_predicate<P>(
        engine: E,
        source: Arc<Mutex<S>>,
        settings: Arc<Settings>,
        config: ProfilerConfig,
        predicate: P,
    ) -> Self
    where
        P: FnOnce() -> bool + UnwindSafe,
    {
        let should_activate = !ACTIVE.load(Ordering::Acquire) && predicate_allows(predicate);

        let resolved = components::resolve(&config.components);
        components::export(&resolved);

        let is_active = Arc::new(AtomicBool::new(false));
        let dispatcher = Dispatcher::new(
            engine,
            Arc::clone(&settings),
            Arc::clone(&is_active),
            config.own_source,
        );

        Self {
            dispatcher: Arc::new(Mutex::new(dispatcher)),
            source,
            settings,
            components: resolved,
            flat: config.flat,
            timeline: config.timeline,
            is_active,
            should_activate,
            activated: false,
            previous: None,
        }
    }

    /// Install the dispatcher and begin measuring.
    ///
    /// No-op for inert instances, for already-started instances, and when
    /// another instance won the active flag since construction.
    pub fn start(&mut self) {
        if !self.should_activate || self.activated {
            return;
        }
        if ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("another profiler activated first; staying idle");
            return;
        }
        self.activated = true;

        {
            let mut dispatcher = self.dispatcher.lock();
            let engine = dispatcher.engine_mut();
            engine.reset();
            let flat = self.flat || self.settings.flat_profile();
            let timeline = self.timeline || self.settings.timeline_profile();
            engine.configure(&self.components, flat, timeline);
        }

        self.is_active.store(true, Ordering::Release);

        let dispatcher = Arc::clone(&self.dispatcher);
        let handler: EventHandler = Box::new(move |event| dispatcher.lock().dispatch(event));
        self.previous = self.source.lock().install(handler);
    }

    /// Bracket every invocation of `f` independently.
    pub fn wrap<T, F>(mut self, mut f: F) -> impl FnMut() -> T
    where
        F: FnMut() -> T,
    {
        move || self.with_instrumentation(&mut f)
    }

    /// Run one program unit under instrumentation.
    ///
    /// Teardown happens on every exit path; a panic in `program` is resumed
    /// unchanged after the previous hook is restored.
    pub fn run<T>(&mut self, program: impl FnOnce() -> T) -> T {
        self.with_instrumentation(program)
    }

    /// Activate and return a guard that deactivates when dropped, whether
    /// the scope is left normally or by unwinding.
    pub fn scope(&mut self) -> ActiveScope<'_, E, S> {
        self.start();
        ActiveScope { profiler: self }
    }

    /// All four bracketing surfaces funnel through here.
    fn with_instrumentation<T>(&mut self, scope: impl FnOnce() -> T) -> T {
        self.start();
        let result = panic::catch_unwind(AssertUnwindSafe(scope));
        self.stop();
        match result {
            Ok(value) => value,
            Err(payload) => {
                tracing::error!("panic unwound through an instrumented scope; hook restored");
                panic::resume_unwind(payload)
            }
        }
    }
}

impl<E: MeasurementEngine, S: CallEventSource> Profiler<E, S> {
    /// Remove the dispatcher and restore the previously installed handler,
    /// including "no handler" if that was the prior state.
    ///
    /// No-op unless this instance activated.
    pub fn stop(&mut self) {
        if !self.activated {
            return;
        }
        self.is_active.store(false, Ordering::Release);

        let mut source = self.source.lock();
        match self.previous.take() {
            Some(handler) => {
                source.install(handler);
            }
            None => {
                source.uninstall();
            }
        }
        drop(source);

        self.activated = false;
        ACTIVE.store(false, Ordering::Release);
    }

    /// Whether this instance currently has its dispatcher installed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.activated
    }

    /// Whether this instance was constructed inert.
    #[must_use]
    pub fn is_inert(&self) -> bool {
        !self.should_activate
    }

    /// The resolved component list.
    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Inspect the dispatcher (runtime state, engine) under its lock.
    pub fn with_dispatcher<R>(&self, f: impl FnOnce(&Dispatcher<E>) -> R) -> R {
        f(&self.dispatcher.lock())
    }
}

impl<E: MeasurementEngine, S: CallEventSource> Drop for Profiler<E, S> {
    fn drop(&mut self) {
        // A dropped controller must not leave its dispatcher installed.
        self.stop();
    }
}

impl<E: MeasurementEngine, S: CallEventSource> std::fmt::Debug for Profiler<E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profiler")
            .field("components", &self.components)
            .field("activated", &self.activated)
            .field("inert", &!self.should_activate)
            .finish_non_exhaustive()
    }
}

/// RAII guard for the block-scoped bracketing surface.
///
/// Dropping the guard deactivates the profiler; unwinding through the block
/// runs the same teardown.
#[must_use = "instrumentation stops when the scope guard is dropped"]
pub struct ActiveScope<'p, E: MeasurementEngine, S: CallEventSource> {
    profiler: &'p mut Profiler<E, S>,
}

impl<E: MeasurementEngine, S: CallEventSource> Drop for ActiveScope<'_, E, S> {
    fn drop(&mut self) {
        self.profiler.stop();
    }
}

impl<E: MeasurementEngine, S: CallEventSource> std::fmt::Debug for ActiveScope<'_, E, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveScope").finish_non_exhaustive()
    }
}
