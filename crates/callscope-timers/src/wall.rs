//! Instant-based timing engine and its aggregated statistics.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use callscope::engine::{EngineError, MeasurementEngine, MeasurementHandle, Result};

/// Aggregated timings for one label.
#[derive(Debug, Clone, Copy)]
pub struct LabelStats {
    /// Number of finalized measurements.
    pub count: u32,
    /// Total duration in nanoseconds.
    pub total_ns: u64,
    /// Minimum duration in nanoseconds.
    pub min_ns: u64,
    /// Maximum duration in nanoseconds.
    pub max_ns: u64,
}

impl Default for LabelStats {
    fn default() -> Self {
        Self {
            count: 0,
            total_ns: 0,
            min_ns: u64::MAX,
            max_ns: 0,
        }
    }
}

impl LabelStats {
    /// Fold one duration into the stats.
    pub fn record(&mut self, duration_ns: u64) {
        self.count += 1;
        self.total_ns += duration_ns;
        self.min_ns = self.min_ns.min(duration_ns);
        self.max_ns = self.max_ns.max(duration_ns);
    }

    /// Average duration in nanoseconds.
    #[must_use]
    pub fn avg_ns(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.total_ns / u64::from(self.count)
        }
    }
}

/// One snapshot row.
#[derive(Debug, Clone)]
pub struct TimerRow {
    /// Measurement label (function, optionally with call-site metadata).
    pub label: String,
    /// Call depth the row was recorded at; present in timeline mode only.
    pub depth: Option<usize>,
    /// The aggregated timings.
    pub stats: LabelStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RowKey {
    label: String,
    depth: Option<usize>,
}

#[derive(Debug, Default)]
struct TimerState {
    stats: HashMap<RowKey, LabelStats>,
    /// Current nesting depth of open handles, used as the timeline key.
    depth: usize,
    flat: bool,
    timeline: bool,
    /// Whether `wall_clock` was among the configured components.
    measuring: bool,
}

/// The engine. Hand it to a `callscope::Profiler`; keep a [`WallClockView`]
/// from [`WallClockEngine::view`] to read results afterwards.
#[derive(Debug)]
pub struct WallClockEngine {
    state: Arc<Mutex<TimerState>>,
}

impl Default for WallClockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClockEngine {
    /// Create an engine that measures until configured otherwise.
    #[must_use]
    pub fn new() -> Self {
        let state = TimerState {
            measuring: true,
            ..TimerState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// A shared read view over the recorded statistics.
    #[must_use]
    pub fn view(&self) -> WallClockView {
        WallClockView {
            state: Arc::clone(&self.state),
        }
    }
}

impl MeasurementEngine for WallClockEngine {
    type Handle = WallClockHandle;

    fn configure(&mut self, components: &[String], flat: bool, timeline: bool) {
        let mut state = self.state.lock();
        state.flat = flat;
        state.timeline = timeline;
        state.measuring = components.iter().any(|c| c == crate::WALL_CLOCK);
        if !state.measuring {
            tracing::warn!("wall_clock not among requested components; engine stays idle");
        }
    }

    fn reset(&mut self) {
        let mut state = self.state.lock();
        state.stats.clear();
        state.depth = 0;
    }

    fn create(&mut self, function: &str, file: &str, line: u32) -> Result<Self::Handle> {
        let state = self.state.lock();
        if !state.measuring {
            return Err(EngineError::UnsupportedComponent(
                crate::WALL_CLOCK.to_owned(),
            ));
        }
        let label = if state.flat || file.is_empty() {
            function.to_owned()
        } else {
            format!("{function}[{file}:{line}]")
        };
        drop(state);

        Ok(WallClockHandle {
            state: Arc::clone(&self.state),
            label,
            depth: None,
            started: None,
        })
    }
}

/// One open wall-clock interval.
#[derive(Debug)]
pub struct WallClockHandle {
    state: Arc<Mutex<TimerState>>,
    label: String,
    depth: Option<usize>,
    started: Option<Instant>,
}

impl MeasurementHandle for WallClockHandle {
    fn start(&mut self) -> Result<()> {
        if self.started.is_some() {
            return Err(EngineError::AlreadyStarted);
        }
        let mut state = self.state.lock();
        if state.timeline {
            self.depth = Some(state.depth);
        }
        state.depth += 1;
        drop(state);
        self.started = Some(Instant::now());
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let started = self.started.take().ok_or(EngineError::NotStarted)?;
        let elapsed = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);

        let mut state = self.state.lock();
        state.depth = state.depth.saturating_sub(1);
        let key = RowKey {
            label: self.label.clone(),
            depth: self.depth,
        };
        state.stats.entry(key).or_default().record(elapsed);
        Ok(())
    }
}

/// Read-only view over an engine's statistics.
#[derive(Debug, Clone)]
pub struct WallClockView {
    state: Arc<Mutex<TimerState>>,
}

impl WallClockView {
    /// Snapshot all rows, sorted by label then depth for stable display.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TimerRow> {
        let state = self.state.lock();
        let mut rows: Vec<TimerRow> = state
            .stats
            .iter()
            .map(|(key, stats)| TimerRow {
                label: key.label.clone(),
                depth: key.depth,
                stats: *stats,
            })
            .collect();
        drop(state);
        rows.sort_by(|a, b| a.label.cmp(&b.label).then(a.depth.cmp(&b.depth)));
        rows
    }

    /// Total number of finalized measurements across all rows.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.state
            .lock()
            .stats
            .values()
            .map(|stats| u64::from(stats.count))
            .sum()
    }
}
