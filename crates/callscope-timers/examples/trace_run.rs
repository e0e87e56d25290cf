//! Profile a toy interpreter run and print the aggregated timings.
//!
//! The interpreter here is a stand-in for any host that notifies an
//! installed trace callback on every call and return.

use std::sync::Arc;

use parking_lot::Mutex;

use callscope::{CallEvent, ManualSource, Profiler, ProfilerConfig, Settings};
use callscope_timers::WallClockEngine;

struct ToyInterpreter {
    source: Arc<Mutex<ManualSource>>,
}

impl ToyInterpreter {
    fn call(&self, function: &str, line: u32, body: impl FnOnce(&Self)) {
        self.source
            .lock()
            .emit(&CallEvent::enter(function, Some("demo.lua"), Some(line)));
        body(self);
        self.source.lock().emit(&CallEvent::exit(function));
    }

    fn run_script(&self) {
        self.call("main", 1, |vm| {
            for _ in 0..10 {
                vm.call("update", 4, |vm| {
                    vm.call("physics", 12, |_| std::thread::yield_now());
                });
            }
            vm.call("render", 20, |_| std::thread::yield_now());
        });
    }
}

fn main() {
    let engine = WallClockEngine::new();
    let view = engine.view();
    let source = Arc::new(Mutex::new(ManualSource::new()));
    let interpreter = ToyInterpreter {
        source: Arc::clone(&source),
    };

    let mut profiler = Profiler::new(
        engine,
        source,
        Settings::shared(),
        ProfilerConfig::default(),
    );
    profiler.run(|| interpreter.run_script());

    println!("{:<28} {:>6} {:>12} {:>12}", "label", "count", "total ns", "avg ns");
    for row in view.snapshot() {
        println!(
            "{:<28} {:>6} {:>12} {:>12}",
            row.label,
            row.stats.count,
            row.stats.total_ns,
            row.stats.avg_ns()
        );
    }
}
