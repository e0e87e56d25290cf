//! Abstraction over the host engine's call/return notification facility.
//!
//! The lifecycle controller never talks to the host directly; it installs
//! and removes its handler through a [`CallEventSource`]. Hosts with a
//! native trace-callback facility implement the trait against it; hosts
//! without one can hold a [`ManualSource`] and pump events through it
//! explicitly.

use crate::events::CallEvent;

/// A process-wide handler invoked once per call/return event.
pub type EventHandler = Box<dyn FnMut(&CallEvent) + Send>;

/// The host engine's hook slot.
///
/// Implementations own at most one installed handler at a time. Installing
/// returns whatever was there before so the caller can restore it exactly,
/// including "no handler".
pub trait CallEventSource {
    /// Install `handler`, returning the previously installed one.
    fn install(&mut self, handler: EventHandler) -> Option<EventHandler>;

    /// Remove and return the current handler.
    fn uninstall(&mut self) -> Option<EventHandler>;

    /// Whether a handler is currently installed.
    fn is_installed(&self) -> bool;
}

/// An in-process event source for hosts that deliver events by direct call.
///
/// Also the vehicle the test suite drives events through.
#[derive(Default)]
pub struct ManualSource {
    handler: Option<EventHandler>,
}

impl ManualSource {
    /// Create a source with no handler installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one event to the installed handler, if any. Events arriving
    /// while no handler is installed are dropped, matching a host that only
    /// notifies an installed trace callback.
    pub fn emit(&mut self, event: &CallEvent) {
        if let Some(handler) = self.handler.as_mut() {
            handler(event);
        }
    }
}

impl CallEventSource for ManualSource {
    fn install(&mut self, handler: EventHandler) -> Option<EventHandler> {
        self.handler.replace(handler)
    }

    fn uninstall(&mut self) -> Option<EventHandler> {
        self.handler.take()
    }

    fn is_installed(&self) -> bool {
        self.handler.is_some()
    }
}

impl std::fmt::Debug for ManualSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualSource")
            .field("installed", &self.is_installed())
            .finish()
    }
}
