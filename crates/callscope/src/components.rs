//! Measurement component list resolution.
//!
//! The component list names which quantities the measurement engine should
//! record. It is assembled from explicit arguments plus the
//! [`COMPONENTS_ENV`] environment variable and re-exported so child
//! processes inherit the same selection.

/// Environment variable holding a comma-separated component list.
pub const COMPONENTS_ENV: &str = "CALLSCOPE_COMPONENTS";

/// Component used when nothing else is requested.
pub const DEFAULT_COMPONENT: &str = "wall_clock";

/// Resolve the effective component list.
///
/// Explicit arguments come first, then the environment list; order is
/// preserved and duplicates are kept. Empty segments are dropped. An empty
/// result falls back to [`DEFAULT_COMPONENT`].
#[must_use]
pub fn resolve(explicit: &[String]) -> Vec<String> {
    let mut components: Vec<String> = explicit
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect();

    if let Ok(raw) = std::env::var(COMPONENTS_ENV) {
        components.extend(
            raw.split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
        );
    }

    if components.is_empty() {
        components.push(DEFAULT_COMPONENT.to_owned());
    }
    components
}

/// Re-export the resolved list to the environment for child processes.
pub fn export(components: &[String]) {
    std::env::set_var(COMPONENTS_ENV, components.join(","));
}
