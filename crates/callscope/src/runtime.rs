//! Per-call-stack bookkeeping: sequence counter, skip ledger, measurement stack.
//!
//! One [`ProfilerRuntime`] exists per observed call stack. Hosts that schedule
//! multiple independent call stacks instantiate one runtime per stack; nothing
//! in here is process-global.

use std::collections::HashMap;

/// Multiset of sequence ids whose Enter event was filtered out.
///
/// The matching Exit event consults the ledger before touching the
/// measurement stack, so a skip decision made at Enter time is honored at
/// Exit time without re-running the filter.
#[derive(Debug, Default)]
pub struct SkipLedger {
    entries: HashMap<i64, u32>,
}

impl SkipLedger {
    /// Record a skipped Enter under `id`.
    pub fn record(&mut self, id: i64) {
        *self.entries.entry(id).or_insert(0) += 1;
    }

    /// Remove one occurrence of `id`. Returns whether one was present.
    pub fn resolve(&mut self, id: i64) -> bool {
        match self.entries.get_mut(&id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.entries.remove(&id);
                true
            }
            None => false,
        }
    }

    /// Number of unresolved skip entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(|count| *count as usize).sum()
    }

    /// Whether the ledger holds no unresolved entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// LIFO stack of in-flight measurement handles.
///
/// Depth always equals the number of currently open instrumented calls.
/// Popping an empty stack is a no-op; malformed external state must not
/// crash the host.
#[derive(Debug)]
pub struct MeasurementStack<H> {
    entries: Vec<H>,
}

impl<H> Default for MeasurementStack<H> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<H> MeasurementStack<H> {
    /// Push a handle, transferring ownership to the stack.
    pub fn push(&mut self, handle: H) {
        self.entries.push(handle);
    }

    /// Pop the most recently pushed handle, if any. The caller must
    /// finalize it.
    pub fn pop(&mut self) -> Option<H> {
        self.entries.pop()
    }

    /// Whether no measurements are in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of measurements in flight.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}

/// All per-call-stack state the dispatcher mutates.
#[derive(Debug)]
pub struct ProfilerRuntime<H> {
    counter: i64,
    ledger: SkipLedger,
    stack: MeasurementStack<H>,
}

impl<H> Default for ProfilerRuntime<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> ProfilerRuntime<H> {
    /// Create a fresh runtime with an empty ledger and stack.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counter: 0,
            ledger: SkipLedger::default(),
            stack: MeasurementStack::default(),
        }
    }

    /// Current sequence counter value. Enter and Exit events both snapshot
    /// this before mutating anything.
    #[must_use]
    pub const fn sequence(&self) -> i64 {
        self.counter
    }

    /// Advance the counter. Called on the instrument branch and the
    /// catch-all skip branch only; the early skip branches leave the counter
    /// untouched. That asymmetry is observed behavior and is kept (see the
    /// regression test pinning it).
    pub fn advance(&mut self) {
        self.counter += 1;
    }

    /// Retreat the counter. Called on every Exit regardless of branch, so
    /// the counter may drift negative under skip-heavy sequences.
    pub fn retreat(&mut self) {
        self.counter -= 1;
    }

    /// Record a skipped Enter under `id`.
    pub fn record_skip(&mut self, id: i64) {
        self.ledger.record(id);
    }

    /// Resolve an Exit against the ledger. Returns whether the call had been
    /// recorded as skipped.
    pub fn resolve_skip(&mut self, id: i64) -> bool {
        self.ledger.resolve(id)
    }

    /// Push an in-flight measurement handle.
    pub fn push(&mut self, handle: H) {
        self.stack.push(handle);
    }

    /// Pop the most recent in-flight handle, if any.
    pub fn pop(&mut self) -> Option<H> {
        self.stack.pop()
    }

    /// Number of measurements currently in flight.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// Number of skipped calls still awaiting their Exit.
    #[must_use]
    pub fn open_skips(&self) -> usize {
        self.ledger.len()
    }
}
