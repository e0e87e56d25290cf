//! Frame filter: decides per Enter event whether a call is instrumented.
//!
//! The filter is a pure function over the call metadata and the current
//! activity/settings view. Exit events are never filtered; pairing for them
//! is handled by the runtime bookkeeping in [`crate::runtime`].

/// Function names that are never instrumented.
///
/// Hosts that model scope teardown as an ordinary method call emit an Enter
/// for the teardown hook while instrumentation is being torn down; measuring
/// it would re-enter the profiler.
pub const SKIP_FUNCTIONS: &[&str] = &["__exit__"];

/// File basenames that are never instrumented (package initializers run
/// during import machinery, not user code).
pub const SKIP_FILES: &[&str] = &["__init__.py"];

/// Suffix a resolved file name may still carry after basename normalization
/// that marks it as a package initializer.
const INITIALIZER_SUFFIX: &str = "__init__.py";

/// The filter's verdict for an Enter event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Open a measurement for this call.
    Instrument,
    /// Do not measure this call.
    Skip(SkipReason),
}

/// Why a call was skipped.
///
/// The reason matters to the caller: the sequence counter advances on the
/// `InitializerPattern` branch but not on the earlier ones (see
/// [`crate::dispatch`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The profiler is not active or globally disabled.
    Inactive,
    /// The call originates from the instrumentation module itself.
    OwnSource,
    /// The function name is in [`SKIP_FUNCTIONS`].
    TeardownName,
    /// The file basename is in [`SKIP_FILES`].
    InitializerFile,
    /// The resolved name still matches the initializer pattern after
    /// basename normalization.
    InitializerPattern,
}

impl Decision {
    /// Whether this decision skips the call.
    #[must_use]
    pub const fn is_skip(self) -> bool {
        matches!(self, Self::Skip(_))
    }
}

/// Reduce a path to its final component.
///
/// Missing metadata arrives as an empty string and stays one.
#[must_use]
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Decide whether a call is instrumented. First matching rule wins.
#[must_use]
pub fn decide(active: bool, enabled: bool, function: &str, file: &str, own_source: &str) -> Decision {
    if !active || !enabled {
        return Decision::Skip(SkipReason::Inactive);
    }
    if !own_source.is_empty() && file == own_source {
        return Decision::Skip(SkipReason::OwnSource);
    }
    if SKIP_FUNCTIONS.contains(&function) {
        return Decision::Skip(SkipReason::TeardownName);
    }
    let base = basename(file);
    if SKIP_FILES.contains(&base) {
        return Decision::Skip(SkipReason::InitializerFile);
    }
    if base.ends_with(INITIALIZER_SUFFIX) {
        return Decision::Skip(SkipReason::InitializerPattern);
    }
    Decision::Instrument
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruments_ordinary_calls() {
        let decision = decide(true, true, "update", "world.lua", "callscope.rs");
        assert_eq!(decision, Decision::Instrument);
    }

    #[test]
    fn inactive_wins_over_everything() {
        let decision = decide(false, true, "__exit__", "__init__.py", "");
        assert_eq!(decision, Decision::Skip(SkipReason::Inactive));
        let decision = decide(true, false, "update", "world.lua", "");
        assert_eq!(decision, Decision::Skip(SkipReason::Inactive));
    }

    #[test]
    fn own_source_is_never_measured() {
        let decision = decide(true, true, "dispatch", "callscope.rs", "callscope.rs");
        assert_eq!(decision, Decision::Skip(SkipReason::OwnSource));
    }

    #[test]
    fn teardown_name_is_never_measured() {
        let decision = decide(true, true, "__exit__", "world.lua", "");
        assert_eq!(decision, Decision::Skip(SkipReason::TeardownName));
    }

    #[test]
    fn initializer_basename_is_skipped() {
        let decision = decide(true, true, "load", "pkg/__init__.py", "");
        assert_eq!(decision, Decision::Skip(SkipReason::InitializerFile));
    }

    #[test]
    fn initializer_pattern_survives_normalization() {
        // Basename is not exactly "__init__.py" but still ends with it.
        let decision = decide(true, true, "load", "pkg/lazy__init__.py", "");
        assert_eq!(decision, Decision::Skip(SkipReason::InitializerPattern));
    }

    #[test]
    fn basename_handles_both_separators() {
        assert_eq!(basename("a/b/c.lua"), "c.lua");
        assert_eq!(basename("a\\b\\c.lua"), "c.lua");
        assert_eq!(basename("c.lua"), "c.lua");
        assert_eq!(basename(""), "");
    }

    #[test]
    fn empty_metadata_is_instrumentable() {
        // Missing file metadata degrades to an empty sentinel, not a skip.
        let decision = decide(true, true, "anon", "", "callscope.rs");
        assert_eq!(decision, Decision::Instrument);
    }
}
