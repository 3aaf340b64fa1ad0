//! The suspend gate: the blocking wait/resume handshake between the build
//! thread and the controller thread.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::*;

use crate::build::{Target, Task};
use crate::cancel::CancelSource;
use crate::common::SourceLocation;
use crate::sink::EventSink;

use super::error::Canceled;
use super::suspend_reason::SuspendReason;
use super::tracker::ExecutionTracker;
use super::Phase;

/// How long a blocked build thread waits between cancellation polls, unless
/// overridden via the builder.
pub(crate) const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Everything guarded by the control lock: the execution tracker together
/// with the wait/resume handshake flags. One lock for both, because the
/// controller's flag writes must be mutually exclusive with the build
/// thread's read-and-clear inside the decision point.
pub(crate) struct ControlState<T, G> {
    pub(crate) tracker: ExecutionTracker<T, G>,
    pub(crate) phase: Phase,
    resumed: bool,
    reason: Option<SuspendReason>,
}

impl<T: Task, G: Target> ControlState<T, G> {
    /// Fresh-build reset: clears tracked position, intentions, and any stale
    /// handshake state from a previous run.
    pub(crate) fn begin_build(&mut self) {
        self.tracker.reset();
        self.resumed = false;
        self.reason = None;
        self.phase = Phase::Running;
    }
}

/// The blocking wait/resume handshake.
///
/// [`enter`](SuspendGate::enter) is only ever called by the single build
/// thread; [`resume`](SuspendGate::resume) may be called from any thread.
/// The wait is bounded so the externally-polled cancellation condition is
/// observed within one poll interval even when no wakeup arrives.
pub(crate) struct SuspendGate<T, G> {
    state: Mutex<ControlState<T, G>>,
    unblocked: Condvar,
    poll_interval: Duration,
}

impl<T: Task, G: Target> SuspendGate<T, G> {
    pub(crate) fn new(poll_interval: Duration) -> SuspendGate<T, G> {
        SuspendGate {
            state: Mutex::new(ControlState {
                tracker: ExecutionTracker::new(),
                phase: Phase::Idle,
                resumed: false,
                reason: None,
            }),
            unblocked: Condvar::new(),
            poll_interval,
        }
    }

    /// Lock the control state. A poisoned lock is taken over rather than
    /// propagated: no flag combination a panicking thread could leave behind
    /// is worse than losing the debug session entirely.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ControlState<T, G>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block the build thread until a controller command resumes it or the
    /// cancellation source fires.
    ///
    /// Cancellation wins when both are observed on the same poll — resuming
    /// into a build that is being torn down is not safe — and the `resumed`
    /// flag is deliberately left as-is in that case. Spurious wakeups are
    /// handled by re-checking both conditions on every iteration.
    pub(crate) fn enter(
        &self,
        reason: SuspendReason,
        location: Option<SourceLocation>,
        events: &impl EventSink,
        cancel: &impl CancelSource,
    ) -> Result<(), Canceled> {
        {
            let mut state = self.lock();
            state.resumed = false;
            state.reason = Some(reason);
            state.phase = Phase::Suspended;
        }
        match &location {
            Some(loc) => debug!("suspended ({}) at {}", reason, loc),
            None => debug!("suspended ({})", reason),
        }
        // Notified outside the lock: the sink is foreign code, and std's
        // Mutex is not reentrant.
        events.on_suspended(reason, location.as_ref());

        let mut state = self.lock();
        loop {
            if cancel.is_canceled() {
                info!("cancellation observed while suspended; unwinding the build thread");
                return Err(Canceled);
            }
            if state.resumed {
                break;
            }
            let (guard, _timed_out) = self
                .unblocked
                .wait_timeout(state, self.poll_interval)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
        state.reason = None;
        state.phase = Phase::Running;
        drop(state);

        debug!("resumed");
        events.on_resumed();
        Ok(())
    }

    /// Wake the build thread if it is blocked in [`enter`](SuspendGate::enter).
    /// Harmless when nothing is suspended: the flag is reset on the next
    /// `enter`.
    pub(crate) fn resume(&self) {
        let mut state = self.lock();
        state.resumed = true;
        self.unblocked.notify_all();
    }

    pub(crate) fn suspend_reason(&self) -> Option<SuspendReason> {
        self.lock().reason
    }
}
