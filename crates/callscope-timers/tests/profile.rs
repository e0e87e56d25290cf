//! Full-stack test: profiler + manual source + wall-clock engine.

use std::sync::Arc;

use parking_lot::Mutex;

use callscope::{CallEvent, ManualSource, Profiler, ProfilerConfig, Settings};
use callscope_timers::WallClockEngine;

// Both tests claim the process-wide active flag.
static SERIAL: Mutex<()> = Mutex::new(());

fn emit(source: &Arc<Mutex<ManualSource>>, event: &CallEvent) {
    source.lock().emit(event);
}

#[test]
fn profiled_run_aggregates_wall_clock_rows() {
    let _serial = SERIAL.lock();

    let engine = WallClockEngine::new();
    let view = engine.view();
    let source = Arc::new(Mutex::new(ManualSource::new()));
    let mut profiler = Profiler::new(
        engine,
        Arc::clone(&source),
        Settings::shared(),
        ProfilerConfig {
            components: vec!["wall_clock".to_owned()],
            ..ProfilerConfig::default()
        },
    );

    profiler.run(|| {
        emit(&source, &CallEvent::enter("frame", Some("game.lua"), Some(1)));
        for _ in 0..3 {
            emit(&source, &CallEvent::enter("update", Some("game.lua"), Some(5)));
            emit(&source, &CallEvent::exit("update"));
        }
        emit(&source, &CallEvent::exit("frame"));
    });

    let rows = view.snapshot();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].label, "frame[game.lua:1]");
    assert_eq!(rows[0].stats.count, 1);
    assert_eq!(rows[1].label, "update[game.lua:5]");
    assert_eq!(rows[1].stats.count, 3);
    // The frame measurement covers its nested updates.
    assert!(rows[0].stats.total_ns >= rows[1].stats.total_ns);
}

#[test]
fn flat_profile_setting_reaches_the_engine() {
    let _serial = SERIAL.lock();

    let engine = WallClockEngine::new();
    let view = engine.view();
    let source = Arc::new(Mutex::new(ManualSource::new()));
    let settings = Settings::shared();
    settings.set_flat_profile(true);
    let mut profiler = Profiler::new(
        engine,
        Arc::clone(&source),
        settings,
        ProfilerConfig {
            components: vec!["wall_clock".to_owned()],
            ..ProfilerConfig::default()
        },
    );

    profiler.run(|| {
        emit(&source, &CallEvent::enter("update", Some("game.lua"), Some(5)));
        emit(&source, &CallEvent::exit("update"));
        emit(&source, &CallEvent::enter("update", Some("world.lua"), Some(9)));
        emit(&source, &CallEvent::exit("update"));
    });

    let rows = view.snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].label, "update");
    assert_eq!(rows[0].stats.count, 2);
}
