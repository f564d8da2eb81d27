//! Easing functions for animations
//!
//! Every named curve maps normalized time `t` in `[0, 1]` to progress with
//! `f(0) == 0` and `f(1) == 1`. The `In` form is the base curve, `Out` is its
//! time reversal `1 - f(1 - t)`, and `InOut` runs the `In` form over the first
//! half and the `Out` form over the second.

use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::{AnimationError, Result};

/// Overshoot constant shared by the back curves
const BACK_OVERSHOOT: f32 = 1.70158;

/// Bounce curve coefficients
const BOUNCE_N: f32 = 7.5625;
const BOUNCE_D: f32 = 2.75;

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInQuint,
    EaseOutQuint,
    EaseInOutQuint,
    EaseInExpo,
    EaseOutExpo,
    EaseInOutExpo,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInElastic,
    EaseOutElastic,
    EaseInOutElastic,
    EaseInBack,
    EaseOutBack,
    EaseInOutBack,
    EaseInBounce,
    EaseOutBounce,
    EaseInOutBounce,
    CubicBezier(CubicBezier),
}

impl Easing {
    /// Every named curve, in declaration order
    pub const ALL_NAMED: [Easing; 28] = [
        Easing::Linear,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInQuart,
        Easing::EaseOutQuart,
        Easing::EaseInOutQuart,
        Easing::EaseInQuint,
        Easing::EaseOutQuint,
        Easing::EaseInOutQuint,
        Easing::EaseInExpo,
        Easing::EaseOutExpo,
        Easing::EaseInOutExpo,
        Easing::EaseInSine,
        Easing::EaseOutSine,
        Easing::EaseInOutSine,
        Easing::EaseInElastic,
        Easing::EaseOutElastic,
        Easing::EaseInOutElastic,
        Easing::EaseInBack,
        Easing::EaseOutBack,
        Easing::EaseInOutBack,
        Easing::EaseInBounce,
        Easing::EaseOutBounce,
        Easing::EaseInOutBounce,
    ];

    /// Apply the easing function to a progress value (0.0 to 1.0).
    ///
    /// Input is clamped to `[0, 1]` and the endpoints are always exact.
    /// Use [`ease`] when out-of-range input should be rejected instead.
    pub fn apply(&self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        if t == 0.0 {
            return 0.0;
        }
        if t == 1.0 {
            return 1.0;
        }

        match self {
            Easing::Linear => t,
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t).powi(2),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::EaseInQuart => t.powi(4),
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t.powi(4)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Easing::EaseInQuint => t.powi(5),
            Easing::EaseOutQuint => 1.0 - (1.0 - t).powi(5),
            Easing::EaseInOutQuint => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
                }
            }
            Easing::EaseInExpo => 2.0_f32.powf(10.0 * t - 10.0),
            Easing::EaseOutExpo => 1.0 - 2.0_f32.powf(-10.0 * t),
            Easing::EaseInOutExpo => {
                if t < 0.5 {
                    2.0_f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Easing::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            Easing::EaseOutSine => (t * PI / 2.0).sin(),
            Easing::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Easing::EaseInElastic => {
                let c4 = (2.0 * PI) / 3.0;
                -(2.0_f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * c4).sin()
            }
            Easing::EaseOutElastic => {
                let c4 = (2.0 * PI) / 3.0;
                2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
            }
            Easing::EaseInOutElastic => {
                let c5 = (2.0 * PI) / 4.5;
                if t < 0.5 {
                    -(2.0_f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * c5).sin()) / 2.0
                } else {
                    (2.0_f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * c5).sin()) / 2.0
                        + 1.0
                }
            }
            Easing::EaseInBack => {
                let c3 = BACK_OVERSHOOT + 1.0;
                c3 * t * t * t - BACK_OVERSHOOT * t * t
            }
            Easing::EaseOutBack => {
                let c3 = BACK_OVERSHOOT + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + BACK_OVERSHOOT * (t - 1.0).powi(2)
            }
            Easing::EaseInOutBack => {
                let c2 = BACK_OVERSHOOT * 1.525;
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((c2 + 1.0) * 2.0 * t - c2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((c2 + 1.0) * (t * 2.0 - 2.0) + c2) + 2.0) / 2.0
                }
            }
            Easing::EaseInBounce => 1.0 - bounce_out(1.0 - t),
            Easing::EaseOutBounce => bounce_out(t),
            Easing::EaseInOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
            Easing::CubicBezier(curve) => curve.sample(t),
        }
    }

    /// Check the curve parameters (only bezier curves carry any)
    pub fn validate(&self) -> Result<()> {
        match self {
            Easing::CubicBezier(curve) => curve.validate(),
            _ => Ok(()),
        }
    }

    /// Kebab-case name, e.g. `in-out-quad`. `None` for bezier curves.
    pub fn name(&self) -> Option<&'static str> {
        let name = match self {
            Easing::Linear => "linear",
            Easing::EaseInQuad => "in-quad",
            Easing::EaseOutQuad => "out-quad",
            Easing::EaseInOutQuad => "in-out-quad",
            Easing::EaseInCubic => "in-cubic",
            Easing::EaseOutCubic => "out-cubic",
            Easing::EaseInOutCubic => "in-out-cubic",
            Easing::EaseInQuart => "in-quart",
            Easing::EaseOutQuart => "out-quart",
            Easing::EaseInOutQuart => "in-out-quart",
            Easing::EaseInQuint => "in-quint",
            Easing::EaseOutQuint => "out-quint",
            Easing::EaseInOutQuint => "in-out-quint",
            Easing::EaseInExpo => "in-expo",
            Easing::EaseOutExpo => "out-expo",
            Easing::EaseInOutExpo => "in-out-expo",
            Easing::EaseInSine => "in-sine",
            Easing::EaseOutSine => "out-sine",
            Easing::EaseInOutSine => "in-out-sine",
            Easing::EaseInElastic => "in-elastic",
            Easing::EaseOutElastic => "out-elastic",
            Easing::EaseInOutElastic => "in-out-elastic",
            Easing::EaseInBack => "in-back",
            Easing::EaseOutBack => "out-back",
            Easing::EaseInOutBack => "in-out-back",
            Easing::EaseInBounce => "in-bounce",
            Easing::EaseOutBounce => "out-bounce",
            Easing::EaseInOutBounce => "in-out-bounce",
            Easing::CubicBezier(_) => return None,
        };
        Some(name)
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::CubicBezier(c) => {
                write!(f, "cubic-bezier({}, {}, {}, {})", c.x1, c.y1, c.x2, c.y2)
            }
            named => f.write_str(named.name().unwrap_or_default()),
        }
    }
}

/// Accepts `in-out-quad`, `inOutQuad`, `easeInOutQuad` and `EASE_IN_OUT_QUAD`.
impl FromStr for Easing {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize_name(s);
        Easing::ALL_NAMED
            .iter()
            .copied()
            .find(|easing| {
                easing
                    .name()
                    .is_some_and(|name| normalize_name(name) == wanted)
            })
            .ok_or_else(|| AnimationError::UnknownEasing(s.to_string()))
    }
}

fn normalize_name(name: &str) -> String {
    let folded: String = name
        .chars()
        .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    match folded.strip_prefix("ease") {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => folded,
    }
}

/// Evaluate an easing, rejecting time values outside `[0, 1]` and bezier
/// curves whose x-coordinates leave `[0, 1]`.
pub fn ease(t: f32, easing: Easing) -> Result<f32> {
    if !(0.0..=1.0).contains(&t) {
        return Err(AnimationError::TimeOutOfRange(t));
    }
    easing.validate()?;
    Ok(easing.apply(t))
}

fn bounce_out(t: f32) -> f32 {
    if t < 1.0 / BOUNCE_D {
        BOUNCE_N * t * t
    } else if t < 2.0 / BOUNCE_D {
        let t = t - 1.5 / BOUNCE_D;
        BOUNCE_N * t * t + 0.75
    } else if t < 2.5 / BOUNCE_D {
        let t = t - 2.25 / BOUNCE_D;
        BOUNCE_N * t * t + 0.9375
    } else {
        let t = t - 2.625 / BOUNCE_D;
        BOUNCE_N * t * t + 0.984375
    }
}

// ============================================================================
// Cubic Bezier
// ============================================================================

const NEWTON_ITERATIONS: usize = 8;
const BISECTION_ITERATIONS: usize = 20;
const SOLVE_EPSILON: f64 = 1e-7;

/// A CSS-style cubic bezier timing curve through (0,0) and (1,1).
///
/// `x1` and `x2` must lie in `[0, 1]` so the curve is a function of time;
/// `y1` and `y2` may overshoot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl CubicBezier {
    pub const EASE: CubicBezier = CubicBezier::new_unchecked(0.25, 0.1, 0.25, 1.0);
    pub const EASE_IN: CubicBezier = CubicBezier::new_unchecked(0.42, 0.0, 1.0, 1.0);
    pub const EASE_OUT: CubicBezier = CubicBezier::new_unchecked(0.0, 0.0, 0.58, 1.0);
    pub const EASE_IN_OUT: CubicBezier = CubicBezier::new_unchecked(0.42, 0.0, 0.58, 1.0);

    /// Create a validated curve
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Result<Self> {
        let curve = Self::new_unchecked(x1, y1, x2, y2);
        curve.validate()?;
        Ok(curve)
    }

    pub const fn new_unchecked(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn validate(&self) -> Result<()> {
        for x in [self.x1, self.x2] {
            if !(0.0..=1.0).contains(&x) {
                return Err(AnimationError::ControlPointOutOfRange(x));
            }
        }
        for y in [self.y1, self.y2] {
            if !y.is_finite() {
                return Err(AnimationError::ControlPointOutOfRange(y));
            }
        }
        Ok(())
    }

    /// Progress at time `t` (matches browser implementations).
    ///
    /// Computes in f64 internally to avoid f32 jitter at high frame rates.
    pub fn sample(&self, t: f32) -> f32 {
        // Endpoints are always exact
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        let s = solve_curve_x(t as f64, self.x1 as f64, self.x2 as f64);
        bezier_sample(s, self.y1 as f64, self.y2 as f64) as f32
    }
}

impl From<CubicBezier> for Easing {
    fn from(curve: CubicBezier) -> Self {
        Easing::CubicBezier(curve)
    }
}

/// Find the curve parameter `s` with `x(s) == x`.
///
/// Newton-Raphson first, bisection when the slope flattens or Newton
/// leaves the unit interval, and finally a linear interpolation between
/// the bracketing samples if bisection runs out of iterations.
fn solve_curve_x(x: f64, x1: f64, x2: f64) -> f64 {
    let mut s = x;
    for _ in 0..NEWTON_ITERATIONS {
        let err = bezier_sample(s, x1, x2) - x;
        if err.abs() < SOLVE_EPSILON {
            return s;
        }
        let slope = bezier_slope(s, x1, x2);
        if slope.abs() < SOLVE_EPSILON {
            break;
        }
        s -= err / slope;
        if !(0.0..=1.0).contains(&s) {
            break;
        }
    }

    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    for _ in 0..BISECTION_ITERATIONS {
        let mid = (lo + hi) * 0.5;
        let val = bezier_sample(mid, x1, x2);
        if (val - x).abs() < SOLVE_EPSILON {
            return mid;
        }
        if val < x {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let x_lo = bezier_sample(lo, x1, x2);
    let x_hi = bezier_sample(hi, x1, x2);
    if x_hi - x_lo > f64::EPSILON {
        lo + (x - x_lo) / (x_hi - x_lo) * (hi - lo)
    } else {
        (lo + hi) * 0.5
    }
}

/// Evaluate cubic bezier at parameter t: B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    // Horner form: ((1-3p2+3p1)t + 3p2-6p1)t + 3p1) * t
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

/// Derivative of cubic bezier: B'(t) = 3(1-t)²·p1 + 6(1-t)t·(p2-p1) + 3t²·(1-p2)
#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_are_exact() {
        for easing in Easing::ALL_NAMED {
            assert_eq!(easing.apply(0.0), 0.0, "{easing} at t=0");
            assert_eq!(easing.apply(1.0), 1.0, "{easing} at t=1");
        }
    }

    #[test]
    fn test_curves_are_continuous() {
        const STEPS: usize = 1000;
        for easing in Easing::ALL_NAMED {
            let mut prev = easing.apply(0.0);
            for i in 1..=STEPS {
                let value = easing.apply(i as f32 / STEPS as f32);
                assert!(
                    (value - prev).abs() < 0.05,
                    "{easing} jumps from {prev} to {value} at step {i}"
                );
                prev = value;
            }
        }
    }

    #[test]
    fn test_in_variants_are_monotonic() {
        let in_curves = [
            Easing::EaseInQuad,
            Easing::EaseInCubic,
            Easing::EaseInQuart,
            Easing::EaseInQuint,
            Easing::EaseInExpo,
            Easing::EaseInSine,
        ];
        for easing in in_curves {
            let mut prev = 0.0;
            for i in 0..=100 {
                let value = easing.apply(i as f32 / 100.0);
                assert!(value >= prev, "{easing} decreases at {i}");
                prev = value;
            }
        }
    }

    #[test]
    fn test_out_is_time_reversal_of_in() {
        let pairs = [
            (Easing::EaseInQuad, Easing::EaseOutQuad),
            (Easing::EaseInCubic, Easing::EaseOutCubic),
            (Easing::EaseInSine, Easing::EaseOutSine),
            (Easing::EaseInBounce, Easing::EaseOutBounce),
            (Easing::EaseInBack, Easing::EaseOutBack),
        ];
        for (ease_in, ease_out) in pairs {
            for t in [0.1, 0.25, 0.5, 0.8] {
                let mirrored = 1.0 - ease_in.apply(1.0 - t);
                assert!((ease_out.apply(t) - mirrored).abs() < 1e-5, "{ease_out} at {t}");
            }
        }
    }

    #[test]
    fn test_in_out_is_symmetric_at_midpoint() {
        for easing in [
            Easing::EaseInOutQuad,
            Easing::EaseInOutCubic,
            Easing::EaseInOutQuint,
            Easing::EaseInOutSine,
            Easing::EaseInOutExpo,
            Easing::EaseInOutBounce,
        ] {
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-5, "{easing}");
        }
    }

    #[test]
    fn test_back_overshoots() {
        assert!(Easing::EaseInBack.apply(0.2) < 0.0);
        assert!(Easing::EaseOutBack.apply(0.8) > 1.0);
    }

    #[test]
    fn test_checked_ease_rejects_out_of_range_time() {
        assert_eq!(
            ease(1.5, Easing::Linear),
            Err(AnimationError::TimeOutOfRange(1.5))
        );
        assert!(ease(-0.1, Easing::EaseInQuad).is_err());
        assert!(ease(f32::NAN, Easing::Linear).is_err());
        assert_eq!(ease(0.25, Easing::Linear), Ok(0.25));
    }

    #[test]
    fn test_bezier_rejects_x_outside_unit_interval() {
        assert_eq!(
            CubicBezier::new(1.2, 0.0, 0.5, 1.0),
            Err(AnimationError::ControlPointOutOfRange(1.2))
        );
        assert!(CubicBezier::new(0.5, 0.0, -0.1, 1.0).is_err());
        // y may overshoot
        assert!(CubicBezier::new(0.68, -0.55, 0.27, 1.55).is_ok());

        let invalid = Easing::CubicBezier(CubicBezier::new_unchecked(0.2, 0.0, 2.0, 1.0));
        assert!(ease(0.5, invalid).is_err());
    }

    #[test]
    fn test_bezier_ease_in_out_is_symmetric() {
        let value = ease(0.5, CubicBezier::EASE_IN_OUT.into()).unwrap();
        assert!((value - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_bezier_linear_curve_is_identity() {
        let linear = CubicBezier::new(0.25, 0.25, 0.75, 0.75).unwrap();
        for t in [0.1, 0.3, 0.5, 0.7, 0.9] {
            assert!((linear.sample(t) - t).abs() < 1e-4, "t={t}");
        }
    }

    #[test]
    fn test_bezier_flat_slope_converges() {
        // x1 = x2 = 0 produces a zero slope at s = 0
        let curve = CubicBezier::new(0.0, 0.0, 0.0, 1.0).unwrap();
        let mut prev = 0.0;
        for i in 1..100 {
            let value = curve.sample(i as f32 / 100.0);
            assert!(value.is_finite());
            assert!(value >= prev - 1e-4);
            prev = value;
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("linear".parse::<Easing>(), Ok(Easing::Linear));
        assert_eq!("in-out-quad".parse::<Easing>(), Ok(Easing::EaseInOutQuad));
        assert_eq!("inOutQuad".parse::<Easing>(), Ok(Easing::EaseInOutQuad));
        assert_eq!("easeOutBack".parse::<Easing>(), Ok(Easing::EaseOutBack));
        assert_eq!("EASE_OUT_BOUNCE".parse::<Easing>(), Ok(Easing::EaseOutBounce));
        assert_eq!(
            "wobble".parse::<Easing>(),
            Err(AnimationError::UnknownEasing("wobble".to_string()))
        );
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for easing in Easing::ALL_NAMED {
            assert_eq!(easing.to_string().parse::<Easing>(), Ok(easing));
        }
    }
}
