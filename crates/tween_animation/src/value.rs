//! Animatable value types
//!
//! Tweens interpolate three kinds of values: plain scalars, RGBA colors and
//! 2D points. Interpolation is linear per component; the easing curve has
//! already been folded into the progress value passed in.

use std::fmt;

/// RGBA color with f32 components (0.0 to 1.0), straight (non-premultiplied) alpha
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create from u8 components (0-255)
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Convert to u8 array [r, g, b, a]
    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            (self.a * 255.0).round() as u8,
        ]
    }

    /// Channel-wise linear interpolation in sRGB space.
    ///
    /// Each channel (alpha included) moves independently. Results are
    /// clamped to `[0, 1]` so overshooting curves cannot produce invalid
    /// colors.
    pub fn lerp(self, to: Color, t: f32) -> Color {
        let mix = |a: f32, b: f32| (a + (b - a) * t).clamp(0.0, 1.0);
        Color {
            r: mix(self.r, to.r),
            g: mix(self.g, to.g),
            b: mix(self.b, to.b),
            a: mix(self.a, to.a),
        }
    }
}

/// A 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point::new(0.0, 0.0);

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, to: Point, t: f32) -> Point {
        Point {
            x: lerp(self.x, to.x, t),
            y: lerp(self.y, to.y, t),
        }
    }
}

/// The kind of value a property animates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Scalar,
    Color,
    Point,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Scalar => "scalar",
            ValueKind::Color => "color",
            ValueKind::Point => "point",
        })
    }
}

/// A concrete value of one of the animatable kinds
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyValue {
    Scalar(f32),
    Color(Color),
    Point(Point),
}

impl PropertyValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            PropertyValue::Scalar(_) => ValueKind::Scalar,
            PropertyValue::Color(_) => ValueKind::Color,
            PropertyValue::Point(_) => ValueKind::Point,
        }
    }

    /// Interpolate toward `to` at progress `t`.
    ///
    /// Mismatched kinds snap to `to`; property specs reject them up front so
    /// this only happens when a binding reports a value of the wrong kind.
    pub fn interpolate(&self, to: &PropertyValue, t: f32) -> PropertyValue {
        match (self, to) {
            (PropertyValue::Scalar(a), PropertyValue::Scalar(b)) => {
                PropertyValue::Scalar(lerp(*a, *b, t))
            }
            (PropertyValue::Color(a), PropertyValue::Color(b)) => {
                PropertyValue::Color(a.lerp(*b, t))
            }
            (PropertyValue::Point(a), PropertyValue::Point(b)) => {
                PropertyValue::Point(a.lerp(*b, t))
            }
            _ => *to,
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            PropertyValue::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<Point> {
        match self {
            PropertyValue::Point(p) => Some(*p),
            _ => None,
        }
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        PropertyValue::Scalar(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Scalar(value as f32)
    }
}

impl From<Color> for PropertyValue {
    fn from(value: Color) -> Self {
        PropertyValue::Color(value)
    }
}

impl From<Point> for PropertyValue {
    fn from(value: Point) -> Self {
        PropertyValue::Point(value)
    }
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
