//! Tween Animation Engine
//!
//! Time-based property animation for UI elements.
//!
//! # Features
//!
//! - **Easing**: 28 named curves plus CSS-style cubic Bézier timing functions
//! - **Tweens**: Delay, pause/resume and stop with exact end values
//! - **Sequences**: Serial and parallel composition of tweens
//! - **Engine**: Frame-clock driven scheduler with cross-thread control
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tween_animation::{Engine, ManualClock, PropertyBinding, PropertyTag, PropertyValue, Tween};
//!
//! #[derive(Default)]
//! struct Element {
//!     opacity: Cell<f32>,
//! }
//!
//! impl PropertyBinding for Element {
//!     fn read_current(&self, _tag: PropertyTag) -> Option<PropertyValue> {
//!         Some(PropertyValue::Scalar(self.opacity.get()))
//!     }
//!
//!     fn apply(&self, _tag: PropertyTag, value: PropertyValue) {
//!         if let Some(v) = value.as_scalar() {
//!             self.opacity.set(v);
//!         }
//!     }
//! }
//!
//! let element = Rc::new(Element::default());
//! let clock = ManualClock::new();
//! let mut engine = Engine::new(clock.clone());
//!
//! let tween = Tween::builder(&element)
//!     .to(PropertyTag::Opacity, 1.0)
//!     .duration(0.5)
//!     .build()
//!     .unwrap();
//! engine.add_tween(tween);
//!
//! clock.set(0.25);
//! engine.frame();
//! assert!((element.opacity.get() - 0.5).abs() < 1e-4);
//! ```

pub mod clock;
pub mod config;
pub mod easing;
pub mod engine;
pub mod error;
pub mod events;
pub mod property;
pub mod sequence;
pub mod tween;
pub mod value;

pub use clock::{FrameClock, ManualClock, MonotonicClock};
pub use config::{EngineConfig, IdlePolicy};
pub use easing::{ease, CubicBezier, Easing};
pub use engine::{Engine, EngineHandle};
pub use error::{AnimationError, Result};
pub use events::AnimationEvent;
pub use property::{PropertyBinding, PropertySpec, PropertyTag};
pub use sequence::{Sequence, SequenceId, SequenceMode};
pub use tween::{Tween, TweenBuilder, TweenId, TweenState, TweenUpdate};
pub use value::{Color, Point, PropertyValue, ValueKind};
