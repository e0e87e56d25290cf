//! Shared profiling settings.
//!
//! The settings object is read-mostly from the dispatcher's perspective;
//! `enabled` may be flipped mid-run from any thread and takes effect on the
//! next Enter event.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Global settings consulted by the filter and the dispatcher.
#[derive(Debug)]
pub struct Settings {
    enabled: AtomicBool,
    flat_profile: AtomicBool,
    timeline_profile: AtomicBool,
    capture_lines: AtomicBool,
    full_paths: AtomicBool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            flat_profile: AtomicBool::new(false),
            timeline_profile: AtomicBool::new(false),
            capture_lines: AtomicBool::new(true),
            full_paths: AtomicBool::new(false),
        }
    }
}

impl Settings {
    /// Create default settings wrapped for sharing.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Whether instrumentation is globally enabled.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Enable or disable instrumentation globally. While disabled, every
    /// Enter event is recorded as a skip and no handles are created.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Whether the measurement engine should aggregate flat (by label only).
    #[must_use]
    pub fn flat_profile(&self) -> bool {
        self.flat_profile.load(Ordering::Relaxed)
    }

    /// Request flat aggregation.
    pub fn set_flat_profile(&self, flat: bool) {
        self.flat_profile.store(flat, Ordering::Relaxed);
    }

    /// Whether the measurement engine should keep timeline (per-depth) rows.
    #[must_use]
    pub fn timeline_profile(&self) -> bool {
        self.timeline_profile.load(Ordering::Relaxed)
    }

    /// Request timeline aggregation.
    pub fn set_timeline_profile(&self, timeline: bool) {
        self.timeline_profile.store(timeline, Ordering::Relaxed);
    }

    /// Whether Enter events resolve source lines.
    #[must_use]
    pub fn capture_lines(&self) -> bool {
        self.capture_lines.load(Ordering::Relaxed)
    }

    /// Toggle source-line resolution.
    pub fn set_capture_lines(&self, capture: bool) {
        self.capture_lines.store(capture, Ordering::Relaxed);
    }

    /// Whether file paths are kept in full rather than reduced to basenames.
    #[must_use]
    pub fn full_paths(&self) -> bool {
        self.full_paths.load(Ordering::Relaxed)
    }

    /// Toggle full-path capture.
    pub fn set_full_paths(&self, full: bool) {
        self.full_paths.store(full, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_profiling_with_basenames() {
        let settings = Settings::default();
        assert!(settings.enabled());
        assert!(settings.capture_lines());
        assert!(!settings.full_paths());
        assert!(!settings.flat_profile());
        assert!(!settings.timeline_profile());
    }

    #[test]
    fn enabled_toggles() {
        let settings = Settings::default();
        settings.set_enabled(false);
        assert!(!settings.enabled());
        settings.set_enabled(true);
        assert!(settings.enabled());
    }
}
