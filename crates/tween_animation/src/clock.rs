//! Frame clock sources
//!
//! The engine reads timestamps from a [`FrameClock`] and tells it when frame
//! callbacks are wanted. The host's display-refresh driver calls
//! [`Engine::tick`](crate::Engine::tick) while subscribed.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// A time source with a subscribe/unsubscribe pair for frame callbacks.
///
/// Timestamps are seconds on a monotonic timeline; only differences matter.
pub trait FrameClock {
    /// Current timestamp in seconds
    fn now(&self) -> f64;

    /// Start delivering frame callbacks
    fn subscribe(&mut self);

    /// Stop delivering frame callbacks
    fn unsubscribe(&mut self);
}

/// Wall-clock source measuring seconds since construction.
///
/// Subscription state is only recorded; the host's frame driver is expected
/// to poll [`Engine::is_subscribed`](crate::Engine::is_subscribed) before
/// scheduling a tick.
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
    subscribed: bool,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            subscribed: false,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn subscribe(&mut self) {
        self.subscribed = true;
    }

    fn unsubscribe(&mut self) {
        self.subscribed = false;
    }
}

#[derive(Debug, Default)]
struct ManualClockState {
    now: Cell<f64>,
    subscribed: Cell<bool>,
    subscribe_calls: Cell<u32>,
    unsubscribe_calls: Cell<u32>,
}

/// Synthetic clock for tests and offline simulation.
///
/// Clones share state, so a test can keep one handle to move time while
/// the engine owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    state: Rc<ManualClockState>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at the given timestamp
    pub fn starting_at(now: f64) -> Self {
        let clock = Self::new();
        clock.set(now);
        clock
    }

    pub fn set(&self, now: f64) {
        self.state.now.set(now);
    }

    /// Move time forward by `dt` seconds and return the new timestamp
    pub fn advance(&self, dt: f64) -> f64 {
        let now = self.state.now.get() + dt;
        self.state.now.set(now);
        now
    }

    pub fn is_subscribed(&self) -> bool {
        self.state.subscribed.get()
    }

    /// Number of subscribe calls received so far
    pub fn subscribe_calls(&self) -> u32 {
        self.state.subscribe_calls.get()
    }

    /// Number of unsubscribe calls received so far
    pub fn unsubscribe_calls(&self) -> u32 {
        self.state.unsubscribe_calls.get()
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> f64 {
        self.state.now.get()
    }

    fn subscribe(&mut self) {
        self.state.subscribed.set(true);
        self.state
            .subscribe_calls
            .set(self.state.subscribe_calls.get() + 1);
    }

    fn unsubscribe(&mut self) {
        self.state.subscribed.set(false);
        self.state
            .unsubscribe_calls
            .set(self.state.unsubscribe_calls.get() + 1);
    }
}
