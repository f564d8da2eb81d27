//! Animatable properties and the host binding seam
//!
//! The engine never touches UI elements directly. A tween describes *what*
//! to animate with [`PropertySpec`]s and hands every interpolated value to
//! the host through [`PropertyBinding`], which knows how to read and write
//! the concrete attribute a [`PropertyTag`] names.

use std::fmt;
use std::str::FromStr;

use crate::error::{AnimationError, Result};
use crate::value::{PropertyValue, ValueKind};

/// A named element attribute that can be animated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyTag {
    // Position & size
    Top,
    Left,
    Width,
    Height,
    CenterX,
    CenterY,

    // Visual
    Opacity,
    BackgroundColor,
    TintColor,
    TextColor,

    // Transform
    ScaleX,
    ScaleY,
    Rotation,
    AnchorPoint,
    ZPosition,

    // Border
    BorderRadius,
    BorderWidth,
    BorderColor,

    // Shadow
    ShadowOpacity,
    ShadowRadius,
    ShadowOffsetX,
    ShadowOffsetY,
    ShadowColor,
}

impl PropertyTag {
    pub const ALL: [PropertyTag; 23] = [
        PropertyTag::Top,
        PropertyTag::Left,
        PropertyTag::Width,
        PropertyTag::Height,
        PropertyTag::CenterX,
        PropertyTag::CenterY,
        PropertyTag::Opacity,
        PropertyTag::BackgroundColor,
        PropertyTag::TintColor,
        PropertyTag::TextColor,
        PropertyTag::ScaleX,
        PropertyTag::ScaleY,
        PropertyTag::Rotation,
        PropertyTag::AnchorPoint,
        PropertyTag::ZPosition,
        PropertyTag::BorderRadius,
        PropertyTag::BorderWidth,
        PropertyTag::BorderColor,
        PropertyTag::ShadowOpacity,
        PropertyTag::ShadowRadius,
        PropertyTag::ShadowOffsetX,
        PropertyTag::ShadowOffsetY,
        PropertyTag::ShadowColor,
    ];

    /// The descriptor name hosts use for this attribute (camelCase)
    pub fn name(&self) -> &'static str {
        match self {
            PropertyTag::Top => "top",
            PropertyTag::Left => "left",
            PropertyTag::Width => "width",
            PropertyTag::Height => "height",
            PropertyTag::CenterX => "centerX",
            PropertyTag::CenterY => "centerY",
            PropertyTag::Opacity => "opacity",
            PropertyTag::BackgroundColor => "backgroundColor",
            PropertyTag::TintColor => "tintColor",
            PropertyTag::TextColor => "textColor",
            PropertyTag::ScaleX => "scaleX",
            PropertyTag::ScaleY => "scaleY",
            PropertyTag::Rotation => "rotation",
            PropertyTag::AnchorPoint => "anchorPoint",
            PropertyTag::ZPosition => "zPosition",
            PropertyTag::BorderRadius => "borderRadius",
            PropertyTag::BorderWidth => "borderWidth",
            PropertyTag::BorderColor => "borderColor",
            PropertyTag::ShadowOpacity => "shadowOpacity",
            PropertyTag::ShadowRadius => "shadowRadius",
            PropertyTag::ShadowOffsetX => "shadowOffsetX",
            PropertyTag::ShadowOffsetY => "shadowOffsetY",
            PropertyTag::ShadowColor => "shadowColor",
        }
    }

    /// The kind of value this attribute holds
    pub fn value_kind(&self) -> ValueKind {
        match self {
            PropertyTag::BackgroundColor
            | PropertyTag::TintColor
            | PropertyTag::TextColor
            | PropertyTag::BorderColor
            | PropertyTag::ShadowColor => ValueKind::Color,
            PropertyTag::AnchorPoint => ValueKind::Point,
            _ => ValueKind::Scalar,
        }
    }
}

impl fmt::Display for PropertyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PropertyTag {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        PropertyTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.name() == s)
            .ok_or_else(|| AnimationError::UnknownProperty(s.to_string()))
    }
}

/// One property a tween drives from a start value to an end value
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropertySpec {
    tag: PropertyTag,
    start: Option<PropertyValue>,
    end: PropertyValue,
}

impl PropertySpec {
    /// Animate from whatever the element currently holds to `end`
    pub fn to(tag: PropertyTag, end: impl Into<PropertyValue>) -> Result<Self> {
        let end = end.into();
        check_kind(tag, &end)?;
        Ok(Self {
            tag,
            start: None,
            end,
        })
    }

    /// Animate from an explicit `start` to `end`
    pub fn from_to(
        tag: PropertyTag,
        start: impl Into<PropertyValue>,
        end: impl Into<PropertyValue>,
    ) -> Result<Self> {
        let start = start.into();
        let end = end.into();
        check_kind(tag, &start)?;
        check_kind(tag, &end)?;
        Ok(Self {
            tag,
            start: Some(start),
            end,
        })
    }

    pub fn tag(&self) -> PropertyTag {
        self.tag
    }

    pub fn start(&self) -> Option<PropertyValue> {
        self.start
    }

    pub fn end(&self) -> PropertyValue {
        self.end
    }

    pub fn value_kind(&self) -> ValueKind {
        self.tag.value_kind()
    }
}

fn check_kind(tag: PropertyTag, value: &PropertyValue) -> Result<()> {
    let expected = tag.value_kind();
    let found = value.kind();
    if expected != found {
        return Err(AnimationError::ValueKindMismatch {
            tag,
            expected,
            found,
        });
    }
    Ok(())
}

/// Reads and writes element attributes on behalf of a tween.
///
/// Implemented by the host's element type. Methods take `&self` because a
/// tween only holds a weak reference to its target; hosts use interior
/// mutability for the actual write.
pub trait PropertyBinding {
    /// Current value of `tag`, or `None` if the element does not expose it
    fn read_current(&self, tag: PropertyTag) -> Option<PropertyValue>;

    /// Commit an interpolated value
    fn apply(&self, tag: PropertyTag, value: PropertyValue);
}
