// SPDX-License-Identifier: MIT OR Apache-2.0
//! Cubic Bézier curve with an optional parallel offset.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Step size per unit of precision used by [`BezierCurveCubic::calculate_length`]
const LENGTH_STEP: f64 = 0.00001;

/// A cubic Bézier curve in 3D
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BezierCurveCubic {
    /// Start point
    pub start_anchor: DVec3,
    /// End point
    pub end_anchor: DVec3,
    /// Control point pulling away from the start
    pub first_control: DVec3,
    /// Control point pulling towards the end
    pub second_control: DVec3,
    /// Offset of the evaluated points along the curve's perpendicular in the XY plane
    pub parallel: f64,
}

impl BezierCurveCubic {
    /// Create a curve without parallel offset
    pub fn new(start_anchor: DVec3, end_anchor: DVec3, first_control: DVec3, second_control: DVec3) -> Self {
        Self {
            start_anchor,
            end_anchor,
            first_control,
            second_control,
            parallel: 0.0,
        }
    }

    /// Set the parallel offset
    pub fn with_parallel(mut self, parallel: f64) -> Self {
        self.parallel = parallel;
        self
    }

    /// Point at parameter `t` in `[0, 1]`.
    ///
    /// With a non-zero parallel offset the point is moved sideways along the
    /// local direction. At `t == 0` that direction is taken from the first
    /// control point instead of the derivative.
    pub fn calculate_point(&self, t: f64) -> DVec3 {
        let c = 1.0 - t;
        let point = self.start_anchor * (c * c * c)
            + self.first_control * (3.0 * t * c * c)
            + self.second_control * (3.0 * t * t * c)
            + self.end_anchor * (t * t * t);

        if self.parallel == 0.0 {
            return point;
        }

        let direction = if t == 0.0 {
            self.first_control - self.start_anchor
        } else {
            self.calculate_point_of_derivative(t)
        };

        let Some(direction) = direction.truncate().try_normalize() else {
            return point;
        };
        let perpendicular = DVec2::new(direction.y, -direction.x) * self.parallel;
        point + perpendicular.extend(0.0)
    }

    /// First derivative at parameter `t`
    pub fn calculate_point_of_derivative(&self, t: f64) -> DVec3 {
        let c = 1.0 - t;
        (self.first_control - self.start_anchor) * (3.0 * c * c)
            + (self.second_control - self.first_control) * (6.0 * c * t)
            + (self.end_anchor - self.second_control) * (3.0 * t * t)
    }

    /// Approximate arc length as a sum of chords.
    ///
    /// The step is `precision * 0.00001`; larger values are faster and
    /// coarser. Precision below 1 is treated as 1.
    pub fn calculate_length(&self, precision: f64) -> f64 {
        let precision = if precision.is_nan() { 1.0 } else { precision.max(1.0) };
        let step = precision * LENGTH_STEP;

        let mut length = 0.0;
        let mut previous = self.calculate_point(0.0);
        let mut t = step;
        while t < 1.0 {
            let point = self.calculate_point(t);
            length += previous.distance(point);
            previous = point;
            t += step;
        }
        length + previous.distance(self.calculate_point(1.0))
    }
}
