//! Debounced value holder
//!
//! A [`DebounceHolder`] is owned by a host that calls
//! [`DebounceHolder::observe`] once per update cycle with the live input.
//! Every change of input or delay cancels the armed timer and arms a new
//! one; the value only settles when a timer survives its full delay.

use crate::delay::Delay;
use crate::scheduler::Scheduler;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Whether the held value is waiting on a timer
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// A timer is armed and the held value may be stale
    Pending,
    /// No timer is armed; the held value matches the last input
    Settled,
}

/// State shared between the holder and its armed callback
struct SettledState<V> {
    /// Last value that survived a full quiet period
    value: V,
    /// Generation of the only timer allowed to commit
    generation: u64,
    /// Timer of the current generation has not fired yet
    armed: bool,
}

/// Holds the settled value of a rapidly changing input
///
/// Created on the host's first update cycle, torn down by dropping it.
/// Dropping cancels any armed timer; a callback that already escaped
/// cancellation finds its generation retired and commits nothing.
pub struct DebounceHolder<V, S: Scheduler> {
    scheduler: S,
    settled: Arc<Mutex<SettledState<V>>>,
    /// Inputs seen on the previous cycle
    input: V,
    delay: Delay,
    pending: Option<S::Handle>,
}

impl<V, S> DebounceHolder<V, S>
where
    V: Clone + PartialEq + Send + 'static,
    S: Scheduler,
{
    /// First update cycle: hold `initial` immediately and arm a timer
    ///
    /// The mount timer commits the value already held, so it is not
    /// observable, but it is armed and cancelled like any other.
    pub fn new(scheduler: S, initial: V, delay: Delay) -> Self {
        let settled = SettledState {
            value: initial.clone(),
            generation: 0,
            armed: false,
        };

        let mut holder = Self {
            scheduler,
            settled: Arc::new(Mutex::new(settled)),
            input: initial,
            delay,
            pending: None,
        };
        holder.arm();
        holder
    }

    /// One update cycle: feed the live input, get the settled value back
    ///
    /// Re-arms the timer whenever `value` or `delay` differ from the
    /// previous cycle, even if `value` equals the settled value.
    pub fn observe(&mut self, value: V, delay: Delay) -> V {
        if value != self.input || delay != self.delay {
            self.input = value;
            self.delay = delay;
            self.arm();
        }
        self.settled()
    }

    /// Current settled value without feeding a new input
    pub fn settled(&self) -> V {
        self.settled.lock().value.clone()
    }

    /// Input seen on the most recent cycle
    pub fn latest_input(&self) -> &V {
        &self.input
    }

    /// Delay seen on the most recent cycle
    pub fn delay(&self) -> Delay {
        self.delay
    }

    /// Whether a timer is still armed
    pub fn phase(&self) -> Phase {
        if self.settled.lock().armed {
            Phase::Pending
        } else {
            Phase::Settled
        }
    }

    /// Cancel the armed timer and schedule one for the current input
    fn arm(&mut self) {
        self.cancel_pending();

        let generation = {
            let mut state = self.settled.lock();
            state.armed = true;
            state.generation
        };

        let captured = self.input.clone();
        let shared = Arc::downgrade(&self.settled);
        let delay = self.delay;

        let handle = self.scheduler.schedule_after(
            delay.as_duration(),
            Box::new(move || commit(&shared, generation, captured, delay)),
        );
        trace!("Armed debounce timer (generation {}, delay {})", generation, delay);

        self.pending = Some(handle);
    }
}

impl<V, S: Scheduler> DebounceHolder<V, S> {
    /// Cancel the armed timer, if any, and retire its generation
    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(&handle);
        }

        let mut state = self.settled.lock();
        state.generation += 1;
        state.armed = false;
    }
}

impl<V, S: Scheduler> Drop for DebounceHolder<V, S> {
    fn drop(&mut self) {
        let was_pending = self.pending.is_some();
        self.cancel_pending();
        debug!("Debounce holder torn down (timer pending: {})", was_pending);
    }
}

/// Timer body: store `value` if `generation` is still the live one
fn commit<V>(shared: &Weak<Mutex<SettledState<V>>>, generation: u64, value: V, delay: Delay) {
    let Some(shared) = shared.upgrade() else {
        trace!("Debounce timer fired after teardown; ignoring");
        return;
    };

    let mut state = shared.lock();
    if state.generation != generation {
        trace!(
            "Stale debounce timer ignored (generation {} != {})",
            generation,
            state.generation
        );
        return;
    }

    state.value = value;
    state.armed = false;
    debug!("Value settled after {} quiet period", delay);
}
