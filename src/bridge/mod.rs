//! The core [`DebugBridge`] type — the lifecycle event sink driven by the
//! build engine — and its controller-side counterpart,
//! [`DebugController`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::*;

use crate::breakpoint::{Breakpoint, BreakpointTable};
use crate::build::{Target, Task};
use crate::cancel::CancelSource;
use crate::common::SourceLocation;
use crate::sink::EventSink;

mod builder;
mod error;
mod gate;
mod suspend_reason;
mod tracker;

pub use builder::{BridgeBuilderError, DebugBridgeBuilder};
pub use error::Canceled;
pub use suspend_reason::SuspendReason;

use gate::SuspendGate;

/// Where the bridge is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// `build_started` has not been observed yet.
    Idle,
    /// The build thread is executing.
    Running,
    /// The build thread is blocked in the suspend gate.
    Suspended,
    /// The build finished, or `terminate` was called.
    Terminated,
}

struct Shared<T: Task, G: Target, E: EventSink, C: CancelSource> {
    gate: SuspendGate<T, G>,
    breakpoints: Mutex<BreakpointTable>,
    events: E,
    cancel: C,
}

impl<T: Task, G: Target, E: EventSink, C: CancelSource> Shared<T, G, E, C> {
    fn breakpoints(&self) -> MutexGuard<'_, BreakpointTable> {
        self.breakpoints
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Common tail of `build_finished` and `terminate`: clear per-build
    /// state and notify the sink — once.
    fn shut_down(&self) {
        let already_terminated = {
            let mut state = self.gate.lock();
            let already = state.phase == Phase::Terminated;
            state.phase = Phase::Terminated;
            state.tracker.reset();
            already
        };
        self.breakpoints().clear();
        if !already_terminated {
            info!("build terminated");
            self.events.on_terminated();
        }
    }
}

/// The build-thread half of the bridge: the lifecycle event sink the build
/// engine drives.
///
/// Not `Clone`, and lifecycle methods take `&mut self`: exactly one thread —
/// the thread executing the build — reports events. The decision-point
/// methods ([`target_started`], [`task_started`], [`task_finished`]) may
/// block the calling thread in the suspend gate, and return [`Canceled`]
/// when the external cancellation source fires while blocked; propagate
/// that outward so the engine can unwind.
///
/// Construct via [`DebugBridge::new`] or [`DebugBridge::builder`]; both
/// return this handle paired with the [`DebugController`] for the other
/// thread.
///
/// [`target_started`]: DebugBridge::target_started
/// [`task_started`]: DebugBridge::task_started
/// [`task_finished`]: DebugBridge::task_finished
pub struct DebugBridge<T: Task, G: Target, E: EventSink, C: CancelSource> {
    shared: Arc<Shared<T, G, E, C>>,
}

impl<T: Task, G: Target, E: EventSink, C: CancelSource> DebugBridge<T, G, E, C> {
    /// Create a bridge with default settings over the given collaborators.
    ///
    /// For fine-grained control (e.g: a custom cancellation poll interval),
    /// use [`DebugBridge::builder`] instead.
    pub fn new(events: E, cancel: C) -> (DebugBridge<T, G, E, C>, DebugController<T, G, E, C>) {
        // cannot fail: the default poll interval is non-zero
        DebugBridgeBuilder::new(events, cancel).build().unwrap()
    }

    /// Create a [`DebugBridgeBuilder`] over the given collaborators.
    pub fn builder(events: E, cancel: C) -> DebugBridgeBuilder<T, G, E, C> {
        DebugBridgeBuilder::new(events, cancel)
    }

    /// The build is starting: allocate fresh per-build state and transition
    /// to [`Phase::Running`].
    ///
    /// Also the reuse point — reporting a new `build_started` after a
    /// previous build terminated starts a new session on the same bridge.
    pub fn build_started(&mut self) {
        info!("build started");
        self.shared.gate.lock().begin_build();
    }

    /// A target is starting. Decision point.
    pub fn target_started(&mut self, target: G) -> Result<(), Canceled> {
        trace!("target started");
        self.shared.gate.lock().tracker.on_target_started(target);
        self.check_suspend()
    }

    /// The current target finished.
    pub fn target_finished(&mut self) {
        trace!("target finished");
        self.shared.gate.lock().tracker.on_target_finished();
    }

    /// A task is starting. Decision point.
    pub fn task_started(&mut self, task: T) -> Result<(), Canceled> {
        trace!("task started");
        self.shared.gate.lock().tracker.on_task_started(task);
        self.check_suspend()
    }

    /// `task` finished. Decision point.
    pub fn task_finished(&mut self, task: T) -> Result<(), Canceled> {
        trace!("task finished");
        self.shared.gate.lock().tracker.on_task_finished(task);
        self.check_suspend()
    }

    /// The build ran to completion: clear per-build state, transition to
    /// [`Phase::Terminated`], and fire `on_terminated` (once).
    pub fn build_finished(&mut self) {
        self.shared.shut_down();
    }

    /// Evaluate the suspend decision at the current boundary and, if it says
    /// suspend, block in the gate until resumed or canceled.
    fn check_suspend(&self) -> Result<(), Canceled> {
        let decision = {
            let mut state = self.shared.gate.lock();
            let location = state.tracker.frontier_location();
            let hit = match &location {
                Some(loc) => self.shared.breakpoints().find(loc).is_some(),
                None => false,
            };
            state.tracker.decide(hit).map(|reason| (reason, location))
        };

        match decision {
            Some((reason, location)) => {
                self.shared
                    .gate
                    .enter(reason, location, &self.shared.events, &self.shared.cancel)
            }
            None => Ok(()),
        }
    }
}

/// The controller-thread half of the bridge: the command surface a debugging
/// UI drives.
///
/// `Clone`, and every command takes `&self`. Commands are fast, non-blocking
/// flag mutations and wakeups, intended to be issued from a UI
/// event-dispatch thread. The upstream controller is assumed to be a single
/// thread; concurrent controllers must be serialized upstream.
pub struct DebugController<T: Task, G: Target, E: EventSink, C: CancelSource> {
    shared: Arc<Shared<T, G, E, C>>,
}

impl<T: Task, G: Target, E: EventSink, C: CancelSource> Clone for DebugController<T, G, E, C> {
    fn clone(&self) -> Self {
        DebugController {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Task, G: Target, E: EventSink, C: CancelSource> DebugController<T, G, E, C> {
    /// Ask the build to pause at the next scheduling boundary.
    ///
    /// Deliberately does not interrupt a task already mid-execution; the
    /// request is consumed by the next decision point.
    pub fn suspend(&self) {
        trace!("controller: suspend requested");
        self.shared.gate.lock().tracker.request_client_suspend();
    }

    /// Resume a suspended build. Harmless no-op when nothing is suspended.
    pub fn resume(&self) {
        trace!("controller: resume");
        self.shared.gate.resume();
    }

    /// Resume, then suspend again at the very next task boundary.
    pub fn step_into(&self) {
        trace!("controller: step into");
        self.shared.gate.lock().tracker.arm_step_into();
        self.shared.gate.resume();
    }

    /// Resume, then suspend again once the task that is current *right now*
    /// reports finished — nested tasks it spawns run through without
    /// stopping.
    ///
    /// Issued while no task is current (suspended at a target boundary),
    /// this degrades to "suspend at the next task boundary".
    pub fn step_over(&self) {
        trace!("controller: step over");
        self.shared.gate.lock().tracker.arm_step_over();
        self.shared.gate.resume();
    }

    /// Register a breakpoint. Re-adding one at the same location replaces
    /// the existing entry.
    ///
    /// Safe to call at any time, including while the build thread is
    /// suspended or running.
    pub fn add_breakpoint(&self, bp: Breakpoint) {
        trace!("controller: add breakpoint at {}", bp.location);
        self.shared.breakpoints().add(bp);
    }

    /// Remove the breakpoint at `location`; no-op if none is registered.
    pub fn remove_breakpoint(&self, location: &SourceLocation) {
        trace!("controller: remove breakpoint at {}", location);
        self.shared.breakpoints().remove(location);
    }

    /// End the debugging session: cleanup equivalent to the build finishing
    /// naturally. Idempotent, and safe to call even if the build never
    /// started.
    ///
    /// Does not unblock a suspended build thread — that is the cancellation
    /// source's job. A controller tearing down a live build sets its cancel
    /// flag first, then calls this.
    pub fn terminate(&self) {
        trace!("controller: terminate");
        self.shared.shut_down();
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.shared.gate.lock().phase
    }

    /// Whether the build thread is currently blocked in the suspend gate.
    pub fn is_suspended(&self) -> bool {
        self.phase() == Phase::Suspended
    }

    /// Why the build is suspended, if it is.
    pub fn suspend_reason(&self) -> Option<SuspendReason> {
        self.shared.gate.suspend_reason()
    }
}
