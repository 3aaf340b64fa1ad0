//! Line breakpoints, and the table the bridge consults at decision points.

use crate::common::SourceLocation;

/// A line breakpoint registered by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    /// Where the breakpoint is set.
    pub location: SourceLocation,
    /// Disabled breakpoints stay registered but never match.
    pub enabled: bool,
}

impl Breakpoint {
    /// Create an enabled breakpoint at `location`.
    pub fn new(location: SourceLocation) -> Breakpoint {
        Breakpoint {
            location,
            enabled: true,
        }
    }
}

/// The set of registered breakpoints.
///
/// Plain data: the bridge wraps the table in a `Mutex`, which is what makes
/// controller-thread mutation mutually exclusive with build-thread lookup.
#[derive(Debug, Default)]
pub(crate) struct BreakpointTable {
    points: Vec<Breakpoint>,
}

impl BreakpointTable {
    pub(crate) fn new() -> BreakpointTable {
        BreakpointTable { points: Vec::new() }
    }

    /// Register `bp`. Adding a second breakpoint at the same location
    /// replaces the existing entry rather than storing a duplicate (which
    /// also makes re-adding the way to flip `enabled`).
    pub(crate) fn add(&mut self, bp: Breakpoint) {
        match self.points.iter_mut().find(|p| p.location == bp.location) {
            Some(existing) => *existing = bp,
            None => self.points.push(bp),
        }
    }

    /// Remove the breakpoint at `location`, if one is registered.
    pub(crate) fn remove(&mut self, location: &SourceLocation) {
        self.points.retain(|p| p.location != *location);
    }

    /// The first *enabled* breakpoint whose location equals `current`.
    pub(crate) fn find(&self, current: &SourceLocation) -> Option<&Breakpoint> {
        self.points
            .iter()
            .find(|p| p.enabled && p.location == *current)
    }

    pub(crate) fn clear(&mut self) {
        self.points.clear();
    }
}
