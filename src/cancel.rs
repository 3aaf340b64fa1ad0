//! The external cancellation seam.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A level-triggered cancellation condition, polled by the suspend gate.
///
/// There is no wakeup channel: the gate re-polls on every bounded wait (see
/// [`DebugBridgeBuilder::poll_interval`]). Once `is_canceled` returns `true`
/// it must keep returning `true` — the gate treats cancellation as
/// irrevocable and unwinds the build thread with [`Canceled`].
///
/// Implemented for [`AtomicBool`] (share an `Arc<AtomicBool>` with whatever
/// owns the cancel button) and for `Arc<C>` over any other source.
///
/// [`DebugBridgeBuilder::poll_interval`]: crate::bridge::DebugBridgeBuilder::poll_interval
/// [`Canceled`]: crate::bridge::Canceled
pub trait CancelSource: Send + Sync {
    /// Has the build been canceled?
    fn is_canceled(&self) -> bool;
}

impl CancelSource for AtomicBool {
    fn is_canceled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<C: CancelSource + ?Sized> CancelSource for Arc<C> {
    fn is_canceled(&self) -> bool {
        (**self).is_canceled()
    }
}
