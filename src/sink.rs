//! The outbound notification seam towards the UI/presentation collaborator.

use std::sync::mpsc;

use crate::bridge::SuspendReason;
use crate::common::SourceLocation;

/// Receives one-way notifications from the bridge.
///
/// [`on_suspended`]/[`on_resumed`] are fired from the *build* thread, from
/// inside the suspend gate; [`on_terminated`] from whichever thread ends the
/// build. Implementations must not block the calling thread for more than a
/// negligible duration — marshal to your own thread instead (the provided
/// impl for [`mpsc::Sender<DebugEvent>`] does exactly that).
///
/// Notifications are fired outside the bridge's internal locks, so an
/// implementation may safely issue controller commands from within a
/// callback (e.g: an auto-stepper that calls `step_into` on every
/// suspension).
///
/// [`on_suspended`]: EventSink::on_suspended
/// [`on_resumed`]: EventSink::on_resumed
/// [`on_terminated`]: EventSink::on_terminated
pub trait EventSink: Send + Sync {
    /// The build thread has suspended.
    ///
    /// `location` is the position the build is paused at, when known: the
    /// current task's position after a task event, otherwise the executing
    /// target's.
    fn on_suspended(&self, reason: SuspendReason, location: Option<&SourceLocation>);

    /// The build thread has been resumed by a controller command.
    fn on_resumed(&self);

    /// The build has ended, naturally or via `terminate()`. Fired exactly
    /// once per build.
    fn on_terminated(&self);
}

/// An [`EventSink`] notification in queueable form, for sinks that forward
/// onto a channel.
#[derive(Debug, Clone, PartialEq)]
pub enum DebugEvent {
    /// See [`EventSink::on_suspended`].
    Suspended {
        /// Why the build suspended.
        reason: SuspendReason,
        /// Where the build is paused, when known.
        location: Option<SourceLocation>,
    },
    /// See [`EventSink::on_resumed`].
    Resumed,
    /// See [`EventSink::on_terminated`].
    Terminated,
}

/// Forward notifications onto a channel, e.g: towards a UI event loop.
///
/// Sends never block; if the receiver is gone the notification is dropped.
impl EventSink for mpsc::Sender<DebugEvent> {
    fn on_suspended(&self, reason: SuspendReason, location: Option<&SourceLocation>) {
        let _ = self.send(DebugEvent::Suspended {
            reason,
            location: location.cloned(),
        });
    }

    fn on_resumed(&self) {
        let _ = self.send(DebugEvent::Resumed);
    }

    fn on_terminated(&self) {
        let _ = self.send(DebugEvent::Terminated);
    }
}

/// Discard all notifications (headless operation, tests).
impl EventSink for () {
    fn on_suspended(&self, _reason: SuspendReason, _location: Option<&SourceLocation>) {}

    fn on_resumed(&self) {}

    fn on_terminated(&self) {}
}
