//! Deterministic virtual clock
//!
//! Time only moves when the owner calls [`ManualClock::advance`],
//! [`ManualClock::tick`] or [`ManualClock::run_pending`]. Timers fire in
//! deadline order; timers sharing a deadline fire in the order they were
//! scheduled.

use crate::scheduler::{Callback, Scheduler};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Handle to a timer scheduled on a [`ManualClock`]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct TimerId(u64);

/// Virtual clock implementing [`Scheduler`]
///
/// Clones share the same timeline, so a test can hand one clone to a
/// holder and keep another to drive time.
#[derive(Clone, Default)]
pub struct ManualClock {
    inner: Arc<Mutex<ClockState>>,
}

#[derive(Default)]
struct ClockState {
    /// Virtual time elapsed since creation
    now: Duration,
    next_id: u64,
    /// Armed timers keyed by (deadline, id)
    timers: BTreeMap<(Duration, u64), Callback>,
    /// id -> deadline, for cancellation
    deadlines: HashMap<u64, Duration>,
    fired: u64,
    cancelled: u64,
}

impl ManualClock {
    /// Create a clock at virtual time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.inner.lock().now
    }

    /// Number of armed timers
    pub fn pending(&self) -> usize {
        self.inner.lock().timers.len()
    }

    /// Number of timers that have fired so far
    pub fn fired(&self) -> u64 {
        self.inner.lock().fired
    }

    /// Number of armed timers removed by [`Scheduler::cancel`]
    pub fn cancelled(&self) -> u64 {
        self.inner.lock().cancelled
    }

    /// Move time forward, firing every timer that falls due on the way
    ///
    /// Returns the number of timers fired.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now().saturating_add(by);
        let fired = self.fire_due(target, u64::MAX);
        self.inner.lock().now = target;
        fired
    }

    /// Fire timers due at the current instant without moving time
    ///
    /// This is how zero-delay timers settle.
    pub fn tick(&self) -> usize {
        self.advance(Duration::ZERO)
    }

    /// Fire every timer armed right now, jumping time to each deadline
    ///
    /// Timers scheduled by the fired callbacks are left armed.
    pub fn run_pending(&self) -> usize {
        let (limit, target) = {
            let state = self.inner.lock();
            let last = state.timers.keys().map(|&(deadline, _)| deadline).max();
            (state.next_id, last.unwrap_or(state.now))
        };
        self.fire_due(target, limit)
    }

    /// Fire timers with deadline <= `target` and id < `id_limit`
    fn fire_due(&self, target: Duration, id_limit: u64) -> usize {
        let mut count = 0;
        loop {
            // Release the lock before running the callback; it may
            // schedule or cancel on this clock.
            let (deadline, id, callback) = {
                let mut state = self.inner.lock();
                let key = state
                    .timers
                    .keys()
                    .copied()
                    .find(|&(_, id)| id < id_limit);
                let Some((deadline, id)) = key.filter(|&(deadline, _)| deadline <= target) else {
                    break;
                };
                let Some(callback) = state.timers.remove(&(deadline, id)) else {
                    break;
                };
                state.deadlines.remove(&id);
                state.now = state.now.max(deadline);
                state.fired += 1;
                (deadline, id, callback)
            };

            trace!("Manual timer {} fired at {:?}", id, deadline);
            callback();
            count += 1;
        }
        count
    }
}

impl Scheduler for ManualClock {
    type Handle = TimerId;

    fn schedule_after(&self, delay: Duration, callback: Callback) -> TimerId {
        let mut state = self.inner.lock();
        let id = state.next_id;
        state.next_id += 1;

        let deadline = state.now.saturating_add(delay);
        state.timers.insert((deadline, id), callback);
        state.deadlines.insert(id, deadline);

        trace!("Manual timer {} scheduled for {:?}", id, deadline);
        TimerId(id)
    }

    fn cancel(&self, handle: &TimerId) {
        let mut state = self.inner.lock();
        if let Some(deadline) = state.deadlines.remove(&handle.0) {
            state.timers.remove(&(deadline, handle.0));
            state.cancelled += 1;
            trace!("Manual timer {} cancelled", handle.0);
        }
    }
}

impl std::fmt::Debug for ManualClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("ManualClock")
            .field("now", &state.now)
            .field("pending", &state.timers.len())
            .field("fired", &state.fired)
            .field("cancelled", &state.cancelled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Callback) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |name: &'static str| -> Callback {
            let log = log_clone.clone();
            Box::new(move || log.lock().push(name))
        };
        (log, make)
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let clock = ManualClock::new();
        let (log, make) = recorder();

        clock.schedule_after(Duration::from_millis(300), make("late"));
        clock.schedule_after(Duration::from_millis(100), make("early"));
        clock.schedule_after(Duration::from_millis(100), make("early-second"));

        assert_eq!(clock.advance(Duration::from_millis(300)), 3);
        assert_eq!(*log.lock(), vec!["early", "early-second", "late"]);
        assert_eq!(clock.now(), Duration::from_millis(300));
    }

    #[test]
    fn test_not_fired_before_deadline() {
        let clock = ManualClock::new();
        let (log, make) = recorder();

        clock.schedule_after(Duration::from_millis(300), make("timer"));
        clock.advance(Duration::from_millis(299));
        assert!(log.lock().is_empty());
        assert_eq!(clock.pending(), 1);

        clock.advance(Duration::from_millis(1));
        assert_eq!(*log.lock(), vec!["timer"]);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn test_zero_delay_is_not_synchronous() {
        let clock = ManualClock::new();
        let (log, make) = recorder();

        clock.schedule_after(Duration::ZERO, make("zero"));
        assert!(log.lock().is_empty());

        assert_eq!(clock.tick(), 1);
        assert_eq!(*log.lock(), vec!["zero"]);
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let clock = ManualClock::new();
        let (log, make) = recorder();

        let handle = clock.schedule_after(Duration::from_millis(10), make("cancelled"));
        clock.cancel(&handle);
        clock.cancel(&handle);
        assert_eq!(clock.cancelled(), 1);

        clock.advance(Duration::from_millis(20));
        assert!(log.lock().is_empty());
        assert_eq!(clock.fired(), 0);
    }

    #[test]
    fn test_cancel_after_fire_is_noop() {
        let clock = ManualClock::new();
        let (log, make) = recorder();

        let handle = clock.schedule_after(Duration::from_millis(10), make("fired"));
        clock.advance(Duration::from_millis(10));
        clock.cancel(&handle);

        assert_eq!(*log.lock(), vec!["fired"]);
        assert_eq!(clock.cancelled(), 0);
    }

    #[test]
    fn test_run_pending_skips_newly_scheduled() {
        let clock = ManualClock::new();
        let count = Arc::new(AtomicUsize::new(0));

        let inner_clock = clock.clone();
        let inner_count = count.clone();
        clock.schedule_after(
            Duration::from_millis(50),
            Box::new(move || {
                inner_count.fetch_add(1, Ordering::SeqCst);
                let again = inner_count.clone();
                inner_clock.schedule_after(
                    Duration::from_millis(50),
                    Box::new(move || {
                        again.fetch_add(1, Ordering::SeqCst);
                    }),
                );
            }),
        );

        assert_eq!(clock.run_pending(), 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(clock.pending(), 1);
        assert_eq!(clock.now(), Duration::from_millis(50));
    }

    #[test]
    fn test_huge_delay_does_not_overflow() {
        let clock = ManualClock::new();
        let (log, make) = recorder();

        clock.schedule_after(Duration::MAX, make("never"));
        clock.advance(Duration::from_secs(3600));
        assert!(log.lock().is_empty());
        assert_eq!(clock.pending(), 1);
    }
}
