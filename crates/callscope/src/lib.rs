//! Exact call-stack instrumentation for engines that emit call/return events.
//!
//! `callscope` hooks into a host execution engine's call/return notification
//! stream (an embedded interpreter, a scripted VM) and measures the cost of
//! function execution without modifying the executed code. It decides per
//! event whether a call is worth measuring, pairs every Enter with its
//! matching Exit even though filtering happens only at Enter time, keeps a
//! stack of in-flight measurements consistent with real call nesting
//! (recursion included), and brackets hook installation around a scope with
//! guaranteed cleanup on every exit path.
//!
//! What gets measured is delegated to a [`MeasurementEngine`] collaborator;
//! the companion `callscope-timers` crate provides a wall-clock one.
//!
//! # Usage
//!
//! ```
//! use callscope::{CallEvent, ManualSource, Profiler, ProfilerConfig, Settings};
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! # use callscope::engine::{MeasurementEngine, MeasurementHandle, Result};
//! # struct NoopEngine;
//! # struct NoopHandle;
//! # impl MeasurementHandle for NoopHandle {
//! #     fn start(&mut self) -> Result<()> { Ok(()) }
//! #     fn stop(&mut self) -> Result<()> { Ok(()) }
//! # }
//! # impl MeasurementEngine for NoopEngine {
//! #     type Handle = NoopHandle;
//! #     fn configure(&mut self, _: &[String], _: bool, _: bool) {}
//! #     fn reset(&mut self) {}
//! #     fn create(&mut self, _: &str, _: &str, _: u32) -> Result<NoopHandle> { Ok(NoopHandle) }
//! # }
//!
//! let source = Arc::new(Mutex::new(ManualSource::new()));
//! let mut profiler = Profiler::new(
//!     NoopEngine,
//!     Arc::clone(&source),
//!     Settings::shared(),
//!     ProfilerConfig::default(),
//! );
//!
//! profiler.run(|| {
//!     // The host delivers events while the program unit runs.
//!     let mut source = source.lock();
//!     source.emit(&CallEvent::enter("update", Some("game.lua"), Some(3)));
//!     source.emit(&CallEvent::exit("update"));
//! });
//! ```

pub mod components;
pub mod controller;
pub mod dispatch;
pub mod engine;
pub mod events;
pub mod filter;
pub mod runtime;
pub mod settings;
pub mod source;

pub use controller::{ActiveScope, Profiler, ProfilerConfig};
pub use dispatch::Dispatcher;
pub use engine::{EngineError, MeasurementEngine, MeasurementHandle};
pub use events::{CallEvent, EventKind};
pub use filter::{Decision, SkipReason};
pub use runtime::{MeasurementStack, ProfilerRuntime, SkipLedger};
pub use settings::Settings;
pub use source::{CallEventSource, EventHandler, ManualSource};
