//! Call/return event types delivered by the host engine.

/// Whether a notification marks the beginning or the end of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A call has begun.
    Enter,
    /// A call has ended.
    Exit,
}

/// One call/return notification from the host engine.
///
/// Events are transient: the dispatcher consumes them as they arrive and
/// keeps nothing of them beyond its own bookkeeping.
#[derive(Debug, Clone)]
pub struct CallEvent {
    /// Enter or Exit.
    pub kind: EventKind,
    /// Name of the function the event refers to.
    pub function: String,
    /// Source file of the function, if the host resolved one. May be a full
    /// path or a basename depending on the host.
    pub file: Option<String>,
    /// Source line of the call site, if the host resolved one.
    pub line: Option<u32>,
}

impl CallEvent {
    /// Create an Enter event.
    #[must_use]
    pub fn enter(function: impl Into<String>, file: Option<&str>, line: Option<u32>) -> Self {
        Self {
            kind: EventKind::Enter,
            function: function.into(),
            file: file.map(String::from),
            line,
        }
    }

    /// Create an Exit event.
    ///
    /// Exit events carry the function name for diagnostics only; pairing is
    /// done by order, not by identity.
    #[must_use]
    pub fn exit(function: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Exit,
            function: function.into(),
            file: None,
            line: None,
        }
    }
}
