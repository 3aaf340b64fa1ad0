//! Suspend reasons reported to the controller-side collaborator.

use std::fmt::{self, Display};

/// Why the build thread suspended.
///
/// Only one reason is reported per suspension, even when several conditions
/// hold at the same decision point: a breakpoint match always wins over
/// step/pause reasons, and among those the bridge consumes flags in a fixed
/// order (step-into, step-over, explicit pause).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SuspendReason {
    /// An enabled breakpoint matched the current source position.
    Breakpoint,
    /// A step-into or step-over request ran its course.
    StepEnd,
    /// The controller asked for an explicit pause.
    ClientRequest,
}

impl Display for SuspendReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use self::SuspendReason::*;
        match self {
            Breakpoint => write!(f, "breakpoint"),
            StepEnd => write!(f, "step end"),
            ClientRequest => write!(f, "client request"),
        }
    }
}
