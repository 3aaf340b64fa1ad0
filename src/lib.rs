//! An in-process debugging bridge for sequential build/task execution
//! engines.
//!
//! `buildstub` sits between a build engine that executes a tree of targets
//! and tasks on a single thread, and a debugging UI running on another
//! thread, allowing the UI to pause, resume, single-step, and set line
//! breakpoints against the executing build — without the engine itself
//! being debug-aware.
//!
//! The engine reports lifecycle events into a [`DebugBridge`] from its build
//! thread; the UI issues commands through a [`DebugController`] from its own
//! thread. At each scheduling boundary (task start, task finish, target
//! start) the bridge decides whether execution should pause — breakpoint
//! hit, step completion, or explicit pause request — and, if so, blocks the
//! build thread in a bounded-wait gate until a controller command resumes it
//! or the external cancellation source fires.
//!
//! [`DebugBridge`]: bridge::DebugBridge
//! [`DebugController`]: bridge::DebugController
//!
//! ## Wiring it up
//!
//! Implement [`build::Task`] and [`build::Target`] for (cheaply cloneable)
//! handles into your engine's model, pick an event sink and a cancellation
//! source, and drive the bridge from the engine's build callbacks:
//!
//! ```
//! # fn main() -> Result<(), buildstub::bridge::Canceled> {
//! use std::sync::atomic::AtomicBool;
//! use std::sync::Arc;
//!
//! use buildstub::bridge::DebugBridge;
//! use buildstub::build;
//! use buildstub::common::SourceLocation;
//!
//! // Handles into the engine's model. Equality is task *identity*.
//! #[derive(Clone, PartialEq)]
//! struct TaskHandle { id: usize, line: u32 }
//!
//! impl build::Task for TaskHandle {
//!     fn location(&self) -> Option<SourceLocation> {
//!         Some(SourceLocation::new("build.xml", self.line))
//!     }
//! }
//!
//! #[derive(Clone)]
//! struct TargetHandle;
//!
//! impl build::Target for TargetHandle {
//!     fn location(&self) -> Option<SourceLocation> { None }
//! }
//!
//! let canceled = Arc::new(AtomicBool::new(false));
//! let (mut bridge, _controller) = DebugBridge::new((), canceled);
//!
//! // Hand `_controller` to the UI thread, then report lifecycle events
//! // from the build thread:
//! bridge.build_started();
//! bridge.target_started(TargetHandle)?;
//! bridge.task_started(TaskHandle { id: 0, line: 4 })?;
//! bridge.task_finished(TaskHandle { id: 0, line: 4 })?;
//! bridge.target_finished();
//! bridge.build_finished();
//! # Ok(())
//! # }
//! ```
//!
//! ## Threading contract
//!
//! Exactly two threads are involved, and the API encodes which half belongs
//! to which:
//!
//! - [`DebugBridge`] is not `Clone` and its lifecycle methods take
//!   `&mut self`: only the single thread executing the build may report
//!   events (and may end up blocked inside them).
//! - [`DebugController`] is `Clone` and its commands take `&self`: they are
//!   fast, non-blocking flag mutations and wakeups, intended for a UI
//!   event-dispatch thread. Multiple *concurrent* controllers are not
//!   supported — serialize commands upstream.
//!
//! Sink notifications ([`sink::EventSink`]) are fired outside the bridge's
//! internal locks, from the build thread (suspension/resumption) or from
//! whichever thread ends the build (termination).
//!
//! ## Cancellation
//!
//! The cancellation condition ([`cancel::CancelSource`]) is a polled
//! predicate with no wakeup channel of its own, so the gate never parks
//! indefinitely: it waits in bounded intervals (500 ms by default) and
//! re-polls on every wake. A canceled build unwinds out of the blocked
//! lifecycle call with [`bridge::Canceled`] instead of resuming, and
//! cancellation wins even against a simultaneous `resume()`.

pub mod breakpoint;
pub mod bridge;
pub mod build;
pub mod cancel;
pub mod common;
pub mod sink;
