//! Single timed tweens
//!
//! A [`Tween`] drives one or more properties of a target element from their
//! start values to their end values over `duration` seconds, after an
//! optional `delay`. All timing is derived from absolute timestamps:
//!
//! ```text
//! elapsed  = now - start_time - paused_total
//! raw      = clamp((elapsed - delay) / duration, 0, 1)
//! progress = easing(raw)
//! ```
//!
//! so a late frame fast-forwards instead of accumulating drift, and time
//! spent paused is excluded exactly.

use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::property::{PropertyBinding, PropertySpec, PropertyTag};
use crate::value::PropertyValue;

/// Unique identifier for a tween
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(u64);

impl TweenId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TweenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tween#{}", self.0)
    }
}

/// Lifecycle state of a tween (and of a sequence)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TweenState {
    /// Built but not started
    #[default]
    Idle,
    /// Started, waiting out the delay
    Delaying,
    /// Interpolating
    Running,
    /// Suspended; paused time does not count toward progress
    Paused,
    /// Finished naturally, stopped, or lost its target
    Completed,
}

/// What a call to [`Tween::update`] did
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TweenUpdate {
    /// Not delaying or running; nothing happened
    Idle,
    /// Still inside the delay window; nothing was written
    Delaying,
    /// Values were applied; carries the clamped progress
    Progressed(f32),
    /// End values were applied and the tween finished
    Completed,
    /// The target element is gone; the tween finished without writing
    Detached,
}

impl TweenUpdate {
    /// True when the tween left the active states during this update
    pub fn is_finished(&self) -> bool {
        matches!(self, TweenUpdate::Completed | TweenUpdate::Detached)
    }
}

/// A timed interpolation of one or more properties on a single element
#[derive(Debug)]
pub struct Tween {
    id: TweenId,
    target: Weak<dyn PropertyBinding>,
    properties: SmallVec<[PropertySpec; 4]>,
    /// Start values captured by `start()`, parallel to `properties`
    start_values: SmallVec<[PropertyValue; 4]>,
    duration: f64,
    delay: f64,
    easing: Easing,
    state: TweenState,
    /// State to restore on resume
    resume_state: TweenState,
    start_time: f64,
    paused_at: f64,
    paused_total: f64,
    /// Last eased value, unclamped so overshooting curves overshoot
    eased: f32,
}

impl Tween {
    /// Default duration in seconds
    pub const DEFAULT_DURATION: f64 = 0.3;

    /// Start building a tween for `target`. Only a weak reference is kept.
    pub fn builder<T: PropertyBinding + 'static>(target: &Rc<T>) -> TweenBuilder {
        let target: Weak<T> = Rc::downgrade(target);
        TweenBuilder::new(target)
    }

    pub fn id(&self) -> TweenId {
        self.id
    }

    pub fn state(&self) -> TweenState {
        self.state
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn properties(&self) -> &[PropertySpec] {
        &self.properties
    }

    /// Whether the target element still exists
    pub fn has_target(&self) -> bool {
        self.target.strong_count() > 0
    }

    /// Delaying, running or paused
    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            TweenState::Delaying | TweenState::Running | TweenState::Paused
        )
    }

    /// Progress as of the last update, clamped to `[0, 1]`
    pub fn progress(&self) -> f32 {
        self.eased.clamp(0.0, 1.0)
    }

    /// Progress the tween would report at `now`, without mutating anything.
    ///
    /// Paused tweens report the value at the moment they were paused.
    pub fn progress_at(&self, now: f64) -> f32 {
        match self.state {
            TweenState::Idle => 0.0,
            TweenState::Completed => self.progress(),
            TweenState::Paused => self.eased_at(self.paused_at).clamp(0.0, 1.0),
            TweenState::Delaying | TweenState::Running => self.eased_at(now).clamp(0.0, 1.0),
        }
    }

    /// Begin (or restart) the tween at `now`.
    ///
    /// Only valid from idle or completed; otherwise ignored. Properties
    /// without an explicit start value read the element's current value.
    pub fn start(&mut self, now: f64) {
        if !matches!(self.state, TweenState::Idle | TweenState::Completed) {
            trace!(id = %self.id, state = ?self.state, "ignoring start");
            return;
        }

        self.start_time = now;
        self.paused_total = 0.0;
        self.eased = 0.0;
        self.capture_start_values();
        self.state = if self.delay > 0.0 {
            TweenState::Delaying
        } else {
            TweenState::Running
        };
        debug!(id = %self.id, state = ?self.state, now, "tween started");
    }

    /// Suspend at `now`. Only valid while delaying or running.
    pub fn pause(&mut self, now: f64) {
        if !matches!(self.state, TweenState::Delaying | TweenState::Running) {
            trace!(id = %self.id, state = ?self.state, "ignoring pause");
            return;
        }
        self.paused_at = now;
        self.resume_state = self.state;
        self.state = TweenState::Paused;
    }

    /// Resume at `now`, excluding the paused interval from elapsed time.
    pub fn resume(&mut self, now: f64) {
        if self.state != TweenState::Paused {
            trace!(id = %self.id, state = ?self.state, "ignoring resume");
            return;
        }
        self.paused_total += (now - self.paused_at).max(0.0);
        self.state = self.resume_state;
    }

    /// Finish immediately without completing. Values stay where they are.
    pub fn stop(&mut self) {
        if !self.is_active() {
            trace!(id = %self.id, state = ?self.state, "ignoring stop");
            return;
        }
        self.state = TweenState::Completed;
        debug!(id = %self.id, "tween stopped");
    }

    /// Advance to `now`, writing interpolated values to the target.
    pub fn update(&mut self, now: f64) -> TweenUpdate {
        if !matches!(self.state, TweenState::Delaying | TweenState::Running) {
            return TweenUpdate::Idle;
        }

        let Some(target) = self.target.upgrade() else {
            debug!(id = %self.id, "target dropped, detaching tween");
            self.state = TweenState::Completed;
            return TweenUpdate::Detached;
        };

        let elapsed = now - self.start_time - self.paused_total;
        if self.state == TweenState::Delaying {
            if elapsed < self.delay {
                return TweenUpdate::Delaying;
            }
            self.state = TweenState::Running;
        }

        let raw = self.raw_time(elapsed);
        let finished = raw >= 1.0;
        self.eased = self.easing.apply(raw as f32);

        for (spec, start) in self.properties.iter().zip(&self.start_values) {
            let value = if finished {
                spec.end()
            } else {
                start.interpolate(&spec.end(), self.eased)
            };
            target.apply(spec.tag(), value);
        }

        if finished {
            self.state = TweenState::Completed;
            debug!(id = %self.id, now, "tween completed");
            TweenUpdate::Completed
        } else {
            TweenUpdate::Progressed(self.progress())
        }
    }

    fn raw_time(&self, elapsed: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((elapsed - self.delay) / self.duration).clamp(0.0, 1.0)
    }

    fn eased_at(&self, now: f64) -> f32 {
        let elapsed = now - self.start_time - self.paused_total;
        self.easing.apply(self.raw_time(elapsed) as f32)
    }

    fn capture_start_values(&mut self) {
        let target = self.target.upgrade();
        self.start_values = self
            .properties
            .iter()
            .map(|spec| {
                spec.start()
                    .or_else(|| {
                        let current = target.as_ref()?.read_current(spec.tag())?;
                        (current.kind() == spec.value_kind()).then_some(current)
                    })
                    .unwrap_or_else(|| spec.end())
            })
            .collect();
    }
}

/// Builder for [`Tween`]
pub struct TweenBuilder {
    target: Weak<dyn PropertyBinding>,
    properties: SmallVec<[PropertySpec; 4]>,
    duration: f64,
    delay: f64,
    easing: Easing,
    error: Option<AnimationError>,
}

impl TweenBuilder {
    pub fn new(target: Weak<dyn PropertyBinding>) -> Self {
        Self {
            target,
            properties: SmallVec::new(),
            duration: Tween::DEFAULT_DURATION,
            delay: 0.0,
            easing: Easing::Linear,
            error: None,
        }
    }

    pub fn property(mut self, spec: PropertySpec) -> Self {
        self.properties.push(spec);
        self
    }

    /// Animate `tag` from its current value to `end`
    pub fn to(self, tag: PropertyTag, end: impl Into<PropertyValue>) -> Self {
        let spec = PropertySpec::to(tag, end);
        self.push_spec(spec)
    }

    /// Animate `tag` from `start` to `end`
    pub fn from_to(
        self,
        tag: PropertyTag,
        start: impl Into<PropertyValue>,
        end: impl Into<PropertyValue>,
    ) -> Self {
        let spec = PropertySpec::from_to(tag, start, end);
        self.push_spec(spec)
    }

    /// Duration in seconds
    pub fn duration(mut self, secs: f64) -> Self {
        self.duration = secs;
        self
    }

    pub fn duration_ms(self, ms: u32) -> Self {
        self.duration(ms as f64 / 1000.0)
    }

    /// Delay in seconds before interpolation begins
    pub fn delay(mut self, secs: f64) -> Self {
        self.delay = secs;
        self
    }

    pub fn delay_ms(self, ms: u32) -> Self {
        self.delay(ms as f64 / 1000.0)
    }

    pub fn easing(mut self, easing: impl Into<Easing>) -> Self {
        self.easing = easing.into();
        self
    }

    /// Validate and produce an idle tween
    pub fn build(self) -> Result<Tween> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(AnimationError::InvalidDuration(self.duration));
        }
        if !self.delay.is_finite() || self.delay < 0.0 {
            return Err(AnimationError::InvalidDelay(self.delay));
        }
        self.easing.validate()?;

        let start_values = self.properties.iter().map(|spec| spec.end()).collect();
        Ok(Tween {
            id: TweenId::next(),
            target: self.target,
            properties: self.properties,
            start_values,
            duration: self.duration,
            delay: self.delay,
            easing: self.easing,
            state: TweenState::Idle,
            resume_state: TweenState::Running,
            start_time: 0.0,
            paused_at: 0.0,
            paused_total: 0.0,
            eased: 0.0,
        })
    }

    fn push_spec(mut self, spec: Result<PropertySpec>) -> Self {
        match spec {
            Ok(spec) => self.properties.push(spec),
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
        self
    }
}
