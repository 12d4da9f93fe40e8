//! Real-time scheduler backed by the tokio timer wheel

use crate::scheduler::{Callback, Scheduler};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::trace;

/// [`Scheduler`] that runs each callback on its own tokio task
///
/// The task sleeps for the requested delay and then invokes the callback.
/// Cancelling aborts the task; aborting a finished task is a no-op.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
    handle: Handle,
}

/// Handle to a timer task spawned by [`TokioScheduler`]
#[derive(Debug)]
pub struct TokioTimer {
    abort: AbortHandle,
}

impl TokioTimer {
    /// Whether the timer task has completed (fired or aborted)
    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

impl TokioScheduler {
    /// Create a scheduler spawning onto the given runtime
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Create a scheduler for the runtime this call runs inside
    ///
    /// Returns `None` outside of a tokio runtime.
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    type Handle = TokioTimer;

    fn schedule_after(&self, delay: Duration, callback: Callback) -> TokioTimer {
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        trace!("Tokio timer scheduled in {:?}", delay);

        TokioTimer {
            abort: task.abort_handle(),
        }
    }

    fn cancel(&self, handle: &TokioTimer) {
        if !handle.abort.is_finished() {
            trace!("Tokio timer cancelled before firing");
        }
        handle.abort.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn flag_callback() -> (Arc<AtomicBool>, Callback) {
        let flag = Arc::new(AtomicBool::new(false));
        let flag_clone = flag.clone();
        (flag, Box::new(move || flag_clone.store(true, Ordering::SeqCst)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let scheduler = TokioScheduler::try_current().unwrap();
        let (fired, callback) = flag_callback();

        let timer = scheduler.schedule_after(Duration::from_millis(300), callback);

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(!fired.load(Ordering::SeqCst));

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(fired.load(Ordering::SeqCst));
        assert!(timer.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_timer_never_fires() {
        let scheduler = TokioScheduler::try_current().unwrap();
        let (fired, callback) = flag_callback();

        let timer = scheduler.schedule_after(Duration::from_millis(100), callback);
        tokio::time::sleep(Duration::from_millis(50)).await;
        scheduler.cancel(&timer);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!fired.load(Ordering::SeqCst));
        assert!(timer.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_fire_is_noop() {
        let scheduler = TokioScheduler::try_current().unwrap();
        let (fired, callback) = flag_callback();

        let timer = scheduler.schedule_after(Duration::ZERO, callback);
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(fired.load(Ordering::SeqCst));

        scheduler.cancel(&timer);
        scheduler.cancel(&timer);
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_is_not_synchronous() {
        let scheduler = TokioScheduler::try_current().unwrap();
        let (fired, callback) = flag_callback();

        let _timer = scheduler.schedule_after(Duration::ZERO, callback);
        assert!(!fired.load(Ordering::SeqCst));

        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_try_current_outside_runtime() {
        assert!(TokioScheduler::try_current().is_none());
    }
}
