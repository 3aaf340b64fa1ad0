//! Trait seams between the bridge and the build engine's model.
//!
//! The bridge never owns or mutates build-engine state. Tasks and targets
//! are opaque handles that it clones into its tracking state and compares;
//! the engine retains full lifecycle authority over the underlying objects.

use crate::common::SourceLocation;

/// One unit of build work, as seen by the bridge.
///
/// The bridge needs exactly two things from a task handle:
///
/// - a source position (if one is known), to match against breakpoints and
///   to report to the UI on suspension, and
/// - *identity*, to answer "is this the very task step-over was armed on".
///
/// Equality via [`PartialEq`] must therefore be identity, not structural
/// equality of task definitions: two distinct invocations of the same task
/// definition are different tasks. A cheap [`Clone`] (an `Arc`-backed handle
/// or a small id struct) is expected — the bridge clones handles on every
/// lifecycle event.
pub trait Task: Clone + PartialEq {
    /// The task's source position, or `None` if unknown.
    ///
    /// Tasks without a position never match breakpoints.
    fn location(&self) -> Option<SourceLocation>;
}

/// A named group of tasks executed together.
///
/// The bridge only tracks "currently executing target or none", so a target
/// handle carries even less than a task: just an optional source position.
pub trait Target: Clone {
    /// The target's source position, or `None` if unknown.
    ///
    /// Returning `None` opts the target out of target-location breakpoints;
    /// breakpoints on its tasks are unaffected.
    fn location(&self) -> Option<SourceLocation>;
}
