//! Animation error types

use thiserror::Error;

use crate::property::PropertyTag;
use crate::value::ValueKind;

/// Errors reported synchronously while building tweens or evaluating easings.
///
/// Every variant is a parameter error. Invalid lifecycle calls and expired
/// targets are not errors: they are ignored or reported as events.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// Normalized time outside `[0, 1]` (or not finite)
    #[error("time {0} is outside [0, 1]")]
    TimeOutOfRange(f32),

    /// Cubic bezier x-coordinate outside `[0, 1]`
    #[error("bezier control point x-coordinate {0} is outside [0, 1]")]
    ControlPointOutOfRange(f32),

    /// Negative, NaN or infinite duration
    #[error("duration must be finite and non-negative, got {0}")]
    InvalidDuration(f64),

    /// Negative, NaN or infinite delay
    #[error("delay must be finite and non-negative, got {0}")]
    InvalidDelay(f64),

    /// Start or end value does not match the kind the property animates
    #[error("property `{tag}` animates {expected} values, got {found}")]
    ValueKindMismatch {
        tag: PropertyTag,
        expected: ValueKind,
        found: ValueKind,
    },

    /// Property name not in the tag table
    #[error("unknown property `{0}`")]
    UnknownProperty(String),

    /// Easing name not in the curve table
    #[error("unknown easing `{0}`")]
    UnknownEasing(String),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
