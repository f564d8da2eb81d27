//! Serial and parallel composition of tweens
//!
//! A [`Sequence`] owns its tweens and controls their lifecycle as one unit.
//! In serial mode exactly one child is active at a time and each child is
//! started at the moment its predecessor finishes. In parallel mode every
//! child starts together and the sequence finishes with the last of them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::events::{record_tween_update, AnimationEvent};
use crate::tween::{Tween, TweenState};

/// Unique identifier for a sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SequenceId(u64);

impl SequenceId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sequence#{}", self.0)
    }
}

/// How a sequence schedules its children
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SequenceMode {
    /// One after another
    #[default]
    Serial,
    /// All at the same time
    Parallel,
}

/// A group of tweens controlled as one unit.
///
/// Uses the tween lifecycle states except `Delaying`: a sequence is idle,
/// running, paused or completed.
#[derive(Debug)]
pub struct Sequence {
    id: SequenceId,
    tweens: Vec<Tween>,
    mode: SequenceMode,
    state: TweenState,
    /// Index of the active child (serial mode only)
    current: usize,
}

impl Sequence {
    pub fn new(tweens: Vec<Tween>, mode: SequenceMode) -> Self {
        Self {
            id: SequenceId::next(),
            tweens,
            mode,
            state: TweenState::Idle,
            current: 0,
        }
    }

    pub fn serial(tweens: Vec<Tween>) -> Self {
        Self::new(tweens, SequenceMode::Serial)
    }

    pub fn parallel(tweens: Vec<Tween>) -> Self {
        Self::new(tweens, SequenceMode::Parallel)
    }

    pub fn id(&self) -> SequenceId {
        self.id
    }

    pub fn mode(&self) -> SequenceMode {
        self.mode
    }

    pub fn state(&self) -> TweenState {
        self.state
    }

    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    /// The active child in serial mode while running or paused
    pub fn active_index(&self) -> Option<usize> {
        let live = matches!(self.state, TweenState::Running | TweenState::Paused);
        (live && self.mode == SequenceMode::Serial && self.current < self.tweens.len())
            .then_some(self.current)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, TweenState::Running | TweenState::Paused)
    }

    /// Mean progress of the children, each weighted equally
    pub fn progress(&self) -> f32 {
        if self.tweens.is_empty() {
            return if self.state == TweenState::Completed { 1.0 } else { 0.0 };
        }
        let total: f32 = match self.mode {
            SequenceMode::Serial => {
                let done = self.current.min(self.tweens.len()) as f32;
                let partial = self.tweens.get(self.current).map_or(0.0, |t| t.progress());
                done + partial
            }
            SequenceMode::Parallel => self.tweens.iter().map(|t| t.progress()).sum(),
        };
        (total / self.tweens.len() as f32).clamp(0.0, 1.0)
    }

    /// Start from the first child (serial) or all children (parallel).
    ///
    /// Only valid from idle or completed.
    pub fn start(&mut self, now: f64) {
        if !matches!(self.state, TweenState::Idle | TweenState::Completed) {
            return;
        }

        self.state = TweenState::Running;
        self.current = 0;
        match self.mode {
            SequenceMode::Serial => {
                if let Some(first) = self.tweens.first_mut() {
                    first.start(now);
                }
            }
            SequenceMode::Parallel => {
                for tween in &mut self.tweens {
                    tween.start(now);
                }
            }
        }
        debug!(id = %self.id, mode = ?self.mode, children = self.tweens.len(), "sequence started");
    }

    pub fn pause(&mut self, now: f64) {
        if self.state != TweenState::Running {
            return;
        }
        self.state = TweenState::Paused;
        for tween in self.live_children() {
            tween.pause(now);
        }
    }

    pub fn resume(&mut self, now: f64) {
        if self.state != TweenState::Paused {
            return;
        }
        self.state = TweenState::Running;
        for tween in self.live_children() {
            tween.resume(now);
        }
    }

    /// Stop the sequence and its live children. No completion is reported
    /// for the sequence or for any child afterwards.
    pub fn stop(&mut self) {
        if !self.is_active() {
            return;
        }
        self.state = TweenState::Completed;
        for tween in self.live_children() {
            tween.stop();
        }
        debug!(id = %self.id, "sequence stopped");
    }

    /// Advance the live children to `now`, appending what happened to
    /// `events`.
    pub fn update(&mut self, now: f64, events: &mut Vec<AnimationEvent>) {
        if self.state != TweenState::Running {
            return;
        }
        match self.mode {
            SequenceMode::Serial => self.update_serial(now, events),
            SequenceMode::Parallel => self.update_parallel(now, events),
        }
    }

    fn update_serial(&mut self, now: f64, events: &mut Vec<AnimationEvent>) {
        let Some(child) = self.tweens.get_mut(self.current) else {
            self.complete(events);
            return;
        };

        let update = child.update(now);
        record_tween_update(child.id(), update, events);
        if !update.is_finished() {
            return;
        }

        self.current += 1;
        match self.tweens.get_mut(self.current) {
            Some(next) => {
                // The next child's clock starts now, not at the sequence start
                next.start(now);
                debug!(id = %self.id, index = self.current, "sequence advanced");
            }
            None => self.complete(events),
        }
    }

    fn update_parallel(&mut self, now: f64, events: &mut Vec<AnimationEvent>) {
        for tween in &mut self.tweens {
            if tween.is_active() {
                let update = tween.update(now);
                record_tween_update(tween.id(), update, events);
            }
        }
        if self.tweens.iter().all(|t| !t.is_active()) {
            self.complete(events);
        }
    }

    fn complete(&mut self, events: &mut Vec<AnimationEvent>) {
        self.state = TweenState::Completed;
        events.push(AnimationEvent::SequenceCompleted { id: self.id });
        debug!(id = %self.id, "sequence completed");
    }

    /// Children that control calls propagate to
    fn live_children(&mut self) -> impl Iterator<Item = &mut Tween> {
        let range = match self.mode {
            SequenceMode::Serial => {
                let end = (self.current + 1).min(self.tweens.len());
                self.current.min(end)..end
            }
            SequenceMode::Parallel => 0..self.tweens.len(),
        };
        self.tweens[range].iter_mut().filter(|t| t.is_active())
    }
}
