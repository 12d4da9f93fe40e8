//! Timer scheduling seam
//!
//! The debounce holder never touches a clock directly. It asks a
//! [`Scheduler`] to run a callback after a delay and to cancel it again.
//! Two implementations ship with this crate:
//! - [`crate::ManualClock`]: virtual time, advanced by hand (tests)
//! - [`crate::TokioScheduler`]: real time on a tokio runtime

use std::time::Duration;

/// Callback run when a timer fires
pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Schedule/cancel primitive used by [`crate::DebounceHolder`]
pub trait Scheduler {
    /// Opaque handle to one scheduled callback
    type Handle;

    /// Run `callback` once `delay` has elapsed
    ///
    /// Must never run the callback synchronously, including for a zero
    /// delay: it fires on the next tick at the earliest.
    fn schedule_after(&self, delay: Duration, callback: Callback) -> Self::Handle;

    /// Cancel a scheduled callback
    ///
    /// Cancelling a timer that already fired or was already cancelled is
    /// a no-op.
    fn cancel(&self, handle: &Self::Handle);
}
