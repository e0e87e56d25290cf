//! End-to-end scenarios driving the full profiler through a manual event
//! source.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

use callscope::engine::Result;
use callscope::CallEventSource;
use callscope::{
    CallEvent, ManualSource, MeasurementEngine, MeasurementHandle, Profiler, ProfilerConfig,
    Settings,
};

// Every scenario claims the process-wide active flag; run them one at a time.
static SERIAL: Mutex<()> = Mutex::new(());

/// Engine that logs handle lifecycles in order.
#[derive(Default)]
struct RecordingEngine {
    log: Arc<Mutex<Vec<String>>>,
}

struct RecordingHandle {
    label: String,
    log: Arc<Mutex<Vec<String>>>,
}

impl MeasurementHandle for RecordingHandle {
    fn start(&mut self) -> Result<()> {
        self.log.lock().push(format!("start {}", self.label));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.log.lock().push(format!("stop {}", self.label));
        Ok(())
    }
}

impl MeasurementEngine for RecordingEngine {
    type Handle = RecordingHandle;

    fn configure(&mut self, _components: &[String], _flat: bool, _timeline: bool) {}

    fn reset(&mut self) {
        self.log.lock().clear();
    }

    fn create(&mut self, function: &str, _file: &str, _line: u32) -> Result<Self::Handle> {
        Ok(RecordingHandle {
            label: function.to_owned(),
            log: Arc::clone(&self.log),
        })
    }
}

struct Fixture {
    profiler: Profiler<RecordingEngine, ManualSource>,
    source: Arc<Mutex<ManualSource>>,
    settings: Arc<Settings>,
    log: Arc<Mutex<Vec<String>>>,
}

fn fixture() -> Fixture {
    let engine = RecordingEngine::default();
    let log = Arc::clone(&engine.log);
    let source = Arc::new(Mutex::new(ManualSource::new()));
    let settings = Settings::shared();
    let profiler = Profiler::new(
        engine,
        Arc::clone(&source),
        Arc::clone(&settings),
        ProfilerConfig::default(),
    );
    Fixture {
        profiler,
        source,
        settings,
        log,
    }
}

fn enter(source: &Arc<Mutex<ManualSource>>, function: &str, line: u32) {
    source
        .lock()
        .emit(&CallEvent::enter(function, Some("game.lua"), Some(line)));
}

fn exit(source: &Arc<Mutex<ManualSource>>, function: &str) {
    source.lock().emit(&CallEvent::exit(function));
}

#[test]
fn f_calls_g_creates_in_order_and_finalizes_in_reverse() {
    let _serial = SERIAL.lock();
    let mut fx = fixture();

    let source = Arc::clone(&fx.source);
    fx.profiler.run(|| {
        enter(&source, "f", 1);
        enter(&source, "g", 2);
        exit(&source, "g");
        exit(&source, "f");
    });

    assert_eq!(*fx.log.lock(), vec!["start f", "start g", "stop g", "stop f"]);
}

#[test]
fn recursion_produces_nested_non_interleaved_pairs() {
    let _serial = SERIAL.lock();
    let mut fx = fixture();

    let source = Arc::clone(&fx.source);
    fx.profiler.run(|| {
        enter(&source, "fib", 4);
        enter(&source, "fib", 4);
        exit(&source, "fib");
        exit(&source, "fib");
    });

    assert_eq!(
        *fx.log.lock(),
        vec!["start fib", "start fib", "stop fib", "stop fib"]
    );
}

#[test]
fn disabled_run_creates_no_handles_and_keeps_the_result() {
    let _serial = SERIAL.lock();
    let mut fx = fixture();
    fx.settings.set_enabled(false);

    let source = Arc::clone(&fx.source);
    let value = fx.profiler.run(|| {
        enter(&source, "f", 1);
        enter(&source, "g", 2);
        exit(&source, "g");
        exit(&source, "f");
        "done"
    });

    assert_eq!(value, "done");
    assert!(fx.log.lock().is_empty());
    fx.profiler
        .with_dispatcher(|d| assert_eq!(d.runtime().depth(), 0));
}

#[test]
fn teardown_method_is_never_instrumented() {
    let _serial = SERIAL.lock();
    let mut fx = fixture();
    // Even with every capture option turned on.
    fx.settings.set_full_paths(true);
    fx.settings.set_capture_lines(true);

    let source = Arc::clone(&fx.source);
    fx.profiler.run(|| {
        enter(&source, "__exit__", 10);
        exit(&source, "__exit__");
    });

    assert!(fx.log.lock().is_empty());
}

#[test]
fn panic_through_run_restores_the_hook_and_propagates() {
    let _serial = SERIAL.lock();
    let mut fx = fixture();

    let source = Arc::clone(&fx.source);
    let panic_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        fx.profiler.run(|| {
            enter(&source, "f", 1);
            panic!("boom");
        })
    }));
    panic::set_hook(panic_hook);

    let payload = outcome.expect_err("panic must reach the caller");
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"boom"));
    assert!(!fx.source.lock().is_installed());
    assert!(!fx.profiler.is_active());

    // The controller is reusable after the unwind.
    fx.profiler.start();
    assert!(fx.profiler.is_active());
    fx.profiler.stop();
}

#[test]
fn panic_through_a_scope_guard_still_tears_down() {
    let _serial = SERIAL.lock();
    let mut fx = fixture();

    let source = Arc::clone(&fx.source);
    let panic_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let _scope = fx.profiler.scope();
        enter(&source, "f", 1);
        panic!("scope failed");
    }));
    panic::set_hook(panic_hook);

    assert!(outcome.is_err());
    assert!(!fx.source.lock().is_installed());
    assert!(!fx.profiler.is_active());
}

#[test]
fn depth_returns_to_zero_over_a_well_nested_sequence() {
    let _serial = SERIAL.lock();
    let mut fx = fixture();

    let source = Arc::clone(&fx.source);
    fx.profiler.run(|| {
        enter(&source, "a", 1);
        enter(&source, "__exit__", 2);
        exit(&source, "__exit__");
        enter(&source, "b", 3);
        enter(&source, "b", 3);
        exit(&source, "b");
        exit(&source, "b");
        exit(&source, "a");
    });

    fx.profiler.with_dispatcher(|d| {
        assert_eq!(d.runtime().depth(), 0);
    });
    // Every started measurement was finalized.
    let log = fx.log.lock();
    let starts = log.iter().filter(|l| l.starts_with("start")).count();
    let stops = log.iter().filter(|l| l.starts_with("stop")).count();
    assert_eq!(starts, 3);
    assert_eq!(starts, stops);
}

#[test]
fn events_before_start_and_after_stop_are_not_measured() {
    let _serial = SERIAL.lock();
    let mut fx = fixture();

    enter(&fx.source, "early", 1);
    exit(&fx.source, "early");

    fx.profiler.start();
    enter(&fx.source, "measured", 1);
    exit(&fx.source, "measured");
    fx.profiler.stop();

    enter(&fx.source, "late", 1);
    exit(&fx.source, "late");

    assert_eq!(*fx.log.lock(), vec!["start measured", "stop measured"]);
}
