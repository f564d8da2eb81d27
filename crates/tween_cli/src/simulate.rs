//! Run a single scalar tween against a synthetic frame clock

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use tracing::{debug, info};
use tween_animation::{
    AnimationEvent, Easing, Engine, EngineConfig, ManualClock, PropertyBinding, PropertyTag,
    PropertyValue, Tween,
};

/// Frames after which a simulation is abandoned
const MAX_FRAMES: u64 = 1_000_000;

/// Parameters for one simulated tween
#[derive(Debug, Clone)]
pub struct Simulation {
    pub property: PropertyTag,
    pub from: f32,
    pub to: f32,
    pub duration: f64,
    pub delay: f64,
    pub easing: Easing,
    /// Pause at this time for the given number of seconds
    pub pause: Option<(f64, f64)>,
    pub fps: u32,
}

/// One line of simulation output
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Value { time: f64, value: f32, progress: f32 },
    Paused { time: f64 },
    Resumed { time: f64 },
    Completed { time: f64 },
}

/// Element that holds a single scalar
struct ConsoleElement {
    value: Cell<f32>,
}

impl PropertyBinding for ConsoleElement {
    fn read_current(&self, _tag: PropertyTag) -> Option<PropertyValue> {
        Some(PropertyValue::Scalar(self.value.get()))
    }

    fn apply(&self, _tag: PropertyTag, value: PropertyValue) {
        if let Some(v) = value.as_scalar() {
            self.value.set(v);
        }
    }
}

impl Simulation {
    /// Drive the tween frame by frame until the engine goes idle
    pub fn run(&self, engine_config: EngineConfig) -> Result<Vec<Sample>> {
        let element = Rc::new(ConsoleElement {
            value: Cell::new(self.from),
        });
        let tween = Tween::builder(&element)
            .from_to(self.property, self.from, self.to)
            .duration(self.duration)
            .delay(self.delay)
            .easing(self.easing)
            .build()?;

        let clock = ManualClock::new();
        let mut engine = Engine::with_config(clock.clone(), engine_config);
        let id = engine.add_tween(tween);
        info!(%id, property = %self.property, easing = %self.easing, fps = self.fps, "simulating");

        let dt = 1.0 / self.fps as f64;
        let mut pause = self.pause;
        let mut resume_at = None;
        let mut samples = Vec::new();

        for frame in 1..=MAX_FRAMES {
            let now = frame as f64 * dt;
            clock.set(now);

            if let Some((at, length)) = pause {
                if now >= at {
                    engine.pause_tween(id);
                    samples.push(Sample::Paused { time: now });
                    resume_at = Some(now + length);
                    pause = None;
                }
            }
            if let Some(at) = resume_at {
                if now >= at {
                    engine.resume_tween(id);
                    samples.push(Sample::Resumed { time: now });
                    resume_at = None;
                }
            }

            for event in engine.frame() {
                match event {
                    AnimationEvent::TweenUpdated { progress, .. } => samples.push(Sample::Value {
                        time: now,
                        value: element.value.get(),
                        progress,
                    }),
                    AnimationEvent::TweenCompleted { .. } => {
                        samples.push(Sample::Completed { time: now })
                    }
                    other => debug!(?other, "unexpected event"),
                }
            }

            if engine.is_idle() {
                debug!(frames = frame, "simulation finished");
                return Ok(samples);
            }
        }

        anyhow::bail!("simulation did not finish within {MAX_FRAMES} frames")
    }
}
