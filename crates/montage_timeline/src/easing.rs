// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing functions used to shape interpolation progress.

use crate::curve::BezierCurveCubic;
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Number of bisection steps used to invert a spline's x coordinate
const SPLINE_ITERATIONS: usize = 40;

/// Maps normalized progress to eased progress.
///
/// Input is in `[0, 1]`. Output usually is too, but back, elastic and
/// spline curves may overshoot.
pub trait EasingFunction {
    /// Eased progress for `t`
    fn ease(&self, t: f64) -> f64;
}

/// CSS-style cubic Bézier easing through `(0,0)`, `(x1,y1)`, `(x2,y2)`, `(1,1)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplineEasing {
    /// First control point x, clamped to `[0, 1]`
    pub x1: f64,
    /// First control point y
    pub y1: f64,
    /// Second control point x, clamped to `[0, 1]`
    pub x2: f64,
    /// Second control point y
    pub y2: f64,
}

impl Default for SplineEasing {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }
}

impl SplineEasing {
    /// Create a spline easing. The x coordinates are clamped so the curve
    /// stays a function of time.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            x1: x1.clamp(0.0, 1.0),
            y1,
            x2: x2.clamp(0.0, 1.0),
            y2,
        }
    }

    fn curve(&self) -> BezierCurveCubic {
        BezierCurveCubic::new(
            DVec3::ZERO,
            DVec3::ONE,
            DVec3::new(self.x1, self.y1, 0.0),
            DVec3::new(self.x2, self.y2, 0.0),
        )
    }

    /// Curve parameter whose x coordinate equals `t`
    fn solve(&self, curve: &BezierCurveCubic, t: f64) -> f64 {
        let (mut low, mut high) = (0.0, 1.0);
        let mut s = 0.5;
        for _ in 0..SPLINE_ITERATIONS {
            s = 0.5 * (low + high);
            if curve.calculate_point(s).x < t {
                low = s;
            } else {
                high = s;
            }
        }
        s
    }

    /// Split into two easings at progress `t`, each rescaled to the unit square.
    pub fn split(&self, t: f64) -> (SplineEasing, SplineEasing) {
        const EPS: f64 = 1e-9;

        let t = t.clamp(0.0, 1.0);
        let s = self.solve(&self.curve(), t);

        let p0 = DVec2::new(0.0, 0.0);
        let p1 = DVec2::new(self.x1, self.y1);
        let p2 = DVec2::new(self.x2, self.y2);
        let p3 = DVec2::new(1.0, 1.0);

        let p01 = p0.lerp(p1, s);
        let p12 = p1.lerp(p2, s);
        let p23 = p2.lerp(p3, s);
        let p012 = p01.lerp(p12, s);
        let p123 = p12.lerp(p23, s);
        let mid = p012.lerp(p123, s);

        let inverse = |v: f64| if v.abs() < EPS { 1.0 } else { 1.0 / v };
        let clean = |v: f64| if v.is_nan() || v.abs() < EPS { 0.0 } else { v };

        let (sx_left, sy_left) = (inverse(mid.x), inverse(mid.y));
        let left = SplineEasing::new(
            clean(p01.x * sx_left),
            clean(p01.y * sy_left),
            clean(p012.x * sx_left),
            clean(p012.y * sy_left),
        );

        let (sx_right, sy_right) = (inverse(1.0 - mid.x), inverse(1.0 - mid.y));
        let right = SplineEasing::new(
            clean((p123.x - mid.x) * sx_right),
            clean((p123.y - mid.y) * sy_right),
            clean((p23.x - mid.x) * sx_right),
            clean((p23.y - mid.y) * sy_right),
        );

        (left, right)
    }
}

impl EasingFunction for SplineEasing {
    fn ease(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        let curve = self.curve();
        let s = self.solve(&curve, t);
        curve.calculate_point(s).y
    }
}

/// The built-in easing curves
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Easing {
    /// Constant speed
    #[default]
    Linear,
    /// Keep the start value until the span ends
    Hold,
    /// Quadratic ease-in
    QuadIn,
    /// Quadratic ease-out
    QuadOut,
    /// Quadratic ease-in-out
    QuadInOut,
    /// Cubic ease-in
    CubicIn,
    /// Cubic ease-out
    CubicOut,
    /// Cubic ease-in-out
    CubicInOut,
    /// Quartic ease-in
    QuartIn,
    /// Quartic ease-out
    QuartOut,
    /// Quartic ease-in-out
    QuartInOut,
    /// Quintic ease-in
    QuintIn,
    /// Quintic ease-out
    QuintOut,
    /// Quintic ease-in-out
    QuintInOut,
    /// Sine ease-in
    SineIn,
    /// Sine ease-out
    SineOut,
    /// Sine ease-in-out
    SineInOut,
    /// Exponential ease-in
    ExpoIn,
    /// Exponential ease-out
    ExpoOut,
    /// Exponential ease-in-out
    ExpoInOut,
    /// Circular ease-in
    CircIn,
    /// Circular ease-out
    CircOut,
    /// Circular ease-in-out
    CircInOut,
    /// Overshooting ease-in
    BackIn,
    /// Overshooting ease-out
    BackOut,
    /// Overshooting ease-in-out
    BackInOut,
    /// Elastic ease-in
    ElasticIn,
    /// Elastic ease-out
    ElasticOut,
    /// Elastic ease-in-out
    ElasticInOut,
    /// Bouncing ease-in
    BounceIn,
    /// Bouncing ease-out
    BounceOut,
    /// Bouncing ease-in-out
    BounceInOut,
    /// Custom cubic Bézier
    Spline(SplineEasing),
}

const BACK_OVERSHOOT: f64 = 1.70158;

fn in_out(t: f64, ease_in: impl Fn(f64) -> f64) -> f64 {
    if t < 0.5 {
        ease_in(2.0 * t) / 2.0
    } else {
        1.0 - ease_in(2.0 - 2.0 * t) / 2.0
    }
}

fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

fn expo_in(t: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else {
        2f64.powf(10.0 * t - 10.0)
    }
}

fn circ_in(t: f64) -> f64 {
    1.0 - (1.0 - t * t).max(0.0).sqrt()
}

fn back_in(t: f64) -> f64 {
    (BACK_OVERSHOOT + 1.0) * t * t * t - BACK_OVERSHOOT * t * t
}

fn elastic_in(t: f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else {
        -(2f64.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * (2.0 * PI / 3.0)).sin()
    }
}

fn bounce_in(t: f64) -> f64 {
    1.0 - bounce_out(1.0 - t)
}

impl EasingFunction for Easing {
    fn ease(&self, t: f64) -> f64 {
        let out = |f: fn(f64) -> f64| 1.0 - f(1.0 - t);
        match self {
            Self::Linear => t,
            Self::Hold => {
                if t >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::QuadIn => t.powi(2),
            Self::QuadOut => out(|x| x.powi(2)),
            Self::QuadInOut => in_out(t, |x| x.powi(2)),
            Self::CubicIn => t.powi(3),
            Self::CubicOut => out(|x| x.powi(3)),
            Self::CubicInOut => in_out(t, |x| x.powi(3)),
            Self::QuartIn => t.powi(4),
            Self::QuartOut => out(|x| x.powi(4)),
            Self::QuartInOut => in_out(t, |x| x.powi(4)),
            Self::QuintIn => t.powi(5),
            Self::QuintOut => out(|x| x.powi(5)),
            Self::QuintInOut => in_out(t, |x| x.powi(5)),
            Self::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Self::SineOut => (t * PI / 2.0).sin(),
            Self::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Self::ExpoIn => expo_in(t),
            Self::ExpoOut => out(expo_in),
            Self::ExpoInOut => in_out(t, expo_in),
            Self::CircIn => circ_in(t),
            Self::CircOut => out(circ_in),
            Self::CircInOut => in_out(t, circ_in),
            Self::BackIn => back_in(t),
            Self::BackOut => out(back_in),
            Self::BackInOut => in_out(t, back_in),
            Self::ElasticIn => elastic_in(t),
            Self::ElasticOut => out(elastic_in),
            Self::ElasticInOut => in_out(t, elastic_in),
            Self::BounceIn => bounce_in(t),
            Self::BounceOut => bounce_out(t),
            Self::BounceInOut => in_out(t, bounce_in),
            Self::Spline(spline) => spline.ease(t),
        }
    }
}

impl Easing {
    /// All parameterless easings, in declaration order
    pub const BUILT_IN: [Easing; 32] = [
        Self::Linear,
        Self::Hold,
        Self::QuadIn,
        Self::QuadOut,
        Self::QuadInOut,
        Self::CubicIn,
        Self::CubicOut,
        Self::CubicInOut,
        Self::QuartIn,
        Self::QuartOut,
        Self::QuartInOut,
        Self::QuintIn,
        Self::QuintOut,
        Self::QuintInOut,
        Self::SineIn,
        Self::SineOut,
        Self::SineInOut,
        Self::ExpoIn,
        Self::ExpoOut,
        Self::ExpoInOut,
        Self::CircIn,
        Self::CircOut,
        Self::CircInOut,
        Self::BackIn,
        Self::BackOut,
        Self::BackInOut,
        Self::ElasticIn,
        Self::ElasticOut,
        Self::ElasticInOut,
        Self::BounceIn,
        Self::BounceOut,
        Self::BounceInOut,
    ];
}
