// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animatable property values.

use glam::{DVec2, DVec3, DVec4};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of an animatable property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnimatedValue {
    /// Single number
    Scalar(f64),
    /// 2D vector
    Vector2(DVec2),
    /// 3D vector
    Vector3(DVec3),
    /// 4D vector or color
    Vector4(DVec4),
    /// Any other value; not interpolated
    Opaque(serde_json::Value),
}

/// Discriminant of an [`AnimatedValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`AnimatedValue::Scalar`]
    Scalar,
    /// [`AnimatedValue::Vector2`]
    Vector2,
    /// [`AnimatedValue::Vector3`]
    Vector3,
    /// [`AnimatedValue::Vector4`]
    Vector4,
    /// [`AnimatedValue::Opaque`]
    Opaque,
}

impl AnimatedValue {
    /// Kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Scalar(_) => ValueKind::Scalar,
            Self::Vector2(_) => ValueKind::Vector2,
            Self::Vector3(_) => ValueKind::Vector3,
            Self::Vector4(_) => ValueKind::Vector4,
            Self::Opaque(_) => ValueKind::Opaque,
        }
    }

    /// Interpolate between `self` and `other` at eased progress `p`.
    ///
    /// Numbers and vectors are lerped component-wise. Opaque values and
    /// mismatched kinds switch to `other` once `p >= 0.5`.
    pub fn interpolate(&self, other: &AnimatedValue, p: f64) -> AnimatedValue {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => Self::Scalar(a + (b - a) * p),
            (Self::Vector2(a), Self::Vector2(b)) => Self::Vector2(a.lerp(*b, p)),
            (Self::Vector3(a), Self::Vector3(b)) => Self::Vector3(a.lerp(*b, p)),
            (Self::Vector4(a), Self::Vector4(b)) => Self::Vector4(a.lerp(*b, p)),
            _ => snap(self, other, p),
        }
    }

    /// Get as scalar if possible
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as 2D vector if possible
    pub fn as_vector2(&self) -> Option<DVec2> {
        match self {
            Self::Vector2(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as 3D vector if possible
    pub fn as_vector3(&self) -> Option<DVec3> {
        match self {
            Self::Vector3(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as 4D vector if possible
    pub fn as_vector4(&self) -> Option<DVec4> {
        match self {
            Self::Vector4(v) => Some(*v),
            _ => None,
        }
    }
}

fn snap(a: &AnimatedValue, b: &AnimatedValue, p: f64) -> AnimatedValue {
    if p >= 0.5 {
        b.clone()
    } else {
        a.clone()
    }
}

impl From<f64> for AnimatedValue {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<DVec2> for AnimatedValue {
    fn from(value: DVec2) -> Self {
        Self::Vector2(value)
    }
}

impl From<DVec3> for AnimatedValue {
    fn from(value: DVec3) -> Self {
        Self::Vector3(value)
    }
}

impl From<DVec4> for AnimatedValue {
    fn from(value: DVec4) -> Self {
        Self::Vector4(value)
    }
}

impl fmt::Display for AnimatedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(v) => write!(f, "{v}"),
            Self::Vector2(v) => write!(f, "({}, {})", v.x, v.y),
            Self::Vector3(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            Self::Vector4(v) => write!(f, "({}, {}, {}, {})", v.x, v.y, v.z, v.w),
            Self::Opaque(v) => write!(f, "{v}"),
        }
    }
}

/// Strategy for interpolating property values
pub trait Interpolator {
    /// Value between `previous` and `next` at eased progress `p`
    fn interpolate(&self, previous: &AnimatedValue, next: &AnimatedValue, p: f64) -> AnimatedValue;
}

/// Interpolator using [`AnimatedValue::interpolate`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolator;

impl Interpolator for LinearInterpolator {
    fn interpolate(&self, previous: &AnimatedValue, next: &AnimatedValue, p: f64) -> AnimatedValue {
        previous.interpolate(next, p)
    }
}

/// Interpolator that never blends, switching to the next value at the midpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscreteInterpolator;

impl Interpolator for DiscreteInterpolator {
    fn interpolate(&self, previous: &AnimatedValue, next: &AnimatedValue, p: f64) -> AnimatedValue {
        snap(previous, next, p)
    }
}

impl<F> Interpolator for F
where
    F: Fn(&AnimatedValue, &AnimatedValue, f64) -> AnimatedValue,
{
    fn interpolate(&self, previous: &AnimatedValue, next: &AnimatedValue, p: f64) -> AnimatedValue {
        self(previous, next, p)
    }
}
