//! Tracks the build thread's position and the pending control intentions,
//! and decides at each scheduling boundary whether execution should pause.

use crate::build::{Target, Task};
use crate::common::SourceLocation;

use super::suspend_reason::SuspendReason;

/// Execution position plus pending control intentions.
///
/// Position fields are written only by the build thread as lifecycle events
/// arrive. Intention flags are flipped by the controller thread (under the
/// control lock) and consumed by the next decision point.
#[derive(Debug)]
pub(crate) struct ExecutionTracker<T, G> {
    current_task: Option<T>,
    current_target: Option<G>,
    last_finished: Option<T>,

    step_into_armed: bool,
    step_over_task: Option<T>,
    client_suspend: bool,
    /// A suspension was decided on ahead of time (step-over issued at a
    /// target boundary); the next decision point consumes it.
    suspend_pending: bool,

    /// The most recent lifecycle event was a task event.
    after_task_event: bool,
    /// Target-location breakpoints are eligible — true between a target's
    /// start and its first task.
    consider_target_breakpoints: bool,
}

impl<T: Task, G: Target> ExecutionTracker<T, G> {
    pub(crate) fn new() -> ExecutionTracker<T, G> {
        ExecutionTracker {
            current_task: None,
            current_target: None,
            last_finished: None,
            step_into_armed: false,
            step_over_task: None,
            client_suspend: false,
            suspend_pending: false,
            after_task_event: false,
            consider_target_breakpoints: false,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = ExecutionTracker::new();
    }

    pub(crate) fn on_target_started(&mut self, target: G) {
        self.after_task_event = false;
        self.consider_target_breakpoints = true;
        self.current_target = Some(target);
    }

    pub(crate) fn on_target_finished(&mut self) {
        self.current_target = None;
    }

    pub(crate) fn on_task_started(&mut self, task: T) {
        self.after_task_event = true;
        self.consider_target_breakpoints = false;
        self.current_task = Some(task);
    }

    pub(crate) fn on_task_finished(&mut self, task: T) {
        self.current_task = None;
        self.last_finished = Some(task);
    }

    pub(crate) fn request_client_suspend(&mut self) {
        self.client_suspend = true;
    }

    pub(crate) fn arm_step_into(&mut self) {
        self.step_into_armed = true;
    }

    /// Arm step-over on the current task. With no task current (suspended at
    /// a target boundary) there is no later task-finish to match against, so
    /// the next decision point suspends unconditionally instead.
    pub(crate) fn arm_step_over(&mut self) {
        self.step_over_task = self.current_task.clone();
        if self.current_task.is_none() {
            self.suspend_pending = true;
        }
    }

    /// The source position to probe breakpoints with — and to report on
    /// suspension: the current task's position after a task event, else the
    /// executing target's while target breakpoints are eligible.
    pub(crate) fn frontier_location(&self) -> Option<SourceLocation> {
        if self.after_task_event {
            return self.current_task.as_ref().and_then(Task::location);
        }
        if self.consider_target_breakpoints {
            return self.current_target.as_ref().and_then(Target::location);
        }
        None
    }

    /// The suspend decision, given whether an enabled breakpoint matched the
    /// frontier location.
    ///
    /// At most one reason is returned, and the flag that produced it is
    /// cleared so a later decision cannot re-trigger on stale state. A
    /// breakpoint match takes priority over every other reason and clears
    /// nothing: a step armed before the breakpoint hit still completes after
    /// the suspension resumes.
    pub(crate) fn decide(&mut self, breakpoint_hit: bool) -> Option<SuspendReason> {
        if breakpoint_hit {
            return Some(SuspendReason::Breakpoint);
        }
        if self.current_task.is_none() {
            return None;
        }
        if self.step_into_armed {
            self.step_into_armed = false;
            return Some(SuspendReason::StepEnd);
        }
        let step_over_done = match (&self.last_finished, &self.step_over_task) {
            (Some(last), Some(armed)) => last == armed,
            _ => false,
        };
        if step_over_done || self.suspend_pending {
            self.step_over_task = None;
            self.suspend_pending = false;
            return Some(SuspendReason::StepEnd);
        }
        if self.client_suspend {
            self.client_suspend = false;
            return Some(SuspendReason::ClientRequest);
        }
        None
    }
}
