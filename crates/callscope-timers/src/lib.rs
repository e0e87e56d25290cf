//! Wall-clock measurement engine for `callscope`.
//!
//! This crate provides the built-in collaborator behind the default
//! `wall_clock` component: every instrumented call gets an `Instant`-based
//! handle, and elapsed time is folded into per-label statistics
//! (count/total/min/max) that callers can snapshot and render however they
//! like. Rendering itself is out of scope here.

mod wall;

pub use wall::{LabelStats, TimerRow, WallClockEngine, WallClockView};

/// Component identifier this engine measures.
pub const WALL_CLOCK: &str = "wall_clock";
