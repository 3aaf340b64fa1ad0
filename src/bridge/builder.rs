use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::breakpoint::BreakpointTable;
use crate::build::{Target, Task};
use crate::cancel::CancelSource;
use crate::sink::EventSink;

use super::gate::{SuspendGate, DEFAULT_POLL_INTERVAL};
use super::{DebugBridge, DebugController, Shared};

/// An error which may occur when building a [`DebugBridge`].
#[derive(Debug)]
#[non_exhaustive]
pub enum BridgeBuilderError {
    /// The cancellation poll interval must be non-zero.
    ZeroPollInterval,
}

impl Display for BridgeBuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use self::BridgeBuilderError::*;
        match self {
            ZeroPollInterval => write!(f, "the cancellation poll interval must be non-zero"),
        }
    }
}

impl std::error::Error for BridgeBuilderError {}

/// Helper to construct and customize a [`DebugBridge`].
pub struct DebugBridgeBuilder<T: Task, G: Target, E: EventSink, C: CancelSource> {
    events: E,
    cancel: C,
    poll_interval: Duration,

    _handles: PhantomData<(T, G)>,
}

impl<T: Task, G: Target, E: EventSink, C: CancelSource> DebugBridgeBuilder<T, G, E, C> {
    /// Create a builder over the given collaborators.
    pub fn new(events: E, cancel: C) -> DebugBridgeBuilder<T, G, E, C> {
        DebugBridgeBuilder {
            events,
            cancel,
            poll_interval: DEFAULT_POLL_INTERVAL,

            _handles: PhantomData,
        }
    }

    /// How long the suspend gate waits between cancellation polls while the
    /// build thread is blocked. Defaults to 500 ms.
    ///
    /// This bounds how stale a cancellation can go unnoticed, not how fast
    /// `resume()` takes effect — resumption is signaled and observed
    /// immediately.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Build the bridge, returning the build-thread handle and the
    /// controller handle.
    pub fn build(
        self,
    ) -> Result<(DebugBridge<T, G, E, C>, DebugController<T, G, E, C>), BridgeBuilderError> {
        if self.poll_interval.is_zero() {
            return Err(BridgeBuilderError::ZeroPollInterval);
        }

        let shared = Arc::new(Shared {
            gate: SuspendGate::new(self.poll_interval),
            breakpoints: Mutex::new(BreakpointTable::new()),
            events: self.events,
            cancel: self.cancel,
        });

        Ok((
            DebugBridge {
                shared: Arc::clone(&shared),
            },
            DebugController { shared },
        ))
    }
}
