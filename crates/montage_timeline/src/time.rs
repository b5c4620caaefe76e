// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time values and pixel/time conversion for the timeline.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Pixels per second at scale 1
pub const SECOND_WIDTH: f64 = 150.0;
/// Height of one layer row in pixels
pub const LAYER_HEIGHT: f64 = 25.0;
/// Smallest scale used for conversions; lower or invalid scales are clamped to it
pub const MIN_SCALE: f64 = 1e-4;

/// A signed point or span on the timeline, in ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Time(i64);

impl Time {
    /// Ticks in one second
    pub const TICKS_PER_SECOND: i64 = 10_000_000;
    /// Zero time
    pub const ZERO: Self = Self(0);
    /// Smallest positive time
    pub const EPSILON: Self = Self(1);

    /// Create from a raw tick count
    pub const fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    /// Raw tick count
    pub const fn ticks(self) -> i64 {
        self.0
    }

    /// Create from whole seconds
    pub const fn from_secs(seconds: i64) -> Self {
        Self(seconds * Self::TICKS_PER_SECOND)
    }

    /// Create from fractional seconds, rounded to the nearest tick
    pub fn from_seconds(seconds: f64) -> Self {
        if !seconds.is_finite() {
            return Self::ZERO;
        }
        Self((seconds * Self::TICKS_PER_SECOND as f64).round() as i64)
    }

    /// Time in fractional seconds
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / Self::TICKS_PER_SECOND as f64
    }

    /// Start of frame `frames` at `rate` frames per second
    pub fn from_frames(frames: i64, rate: u32) -> Self {
        let rate = i128::from(rate.max(1));
        let ticks = div_round_half_even(i128::from(frames) * i128::from(Self::TICKS_PER_SECOND), rate);
        Self(ticks as i64)
    }

    /// Nearest frame index at `rate`; ties go to the even frame
    pub fn to_frames(self, rate: u32) -> i64 {
        let rate = i128::from(rate.max(1));
        div_round_half_even(i128::from(self.0) * rate, i128::from(Self::TICKS_PER_SECOND)) as i64
    }

    /// Frame index containing this time at `rate`
    pub fn floor_frames(self, rate: u32) -> i64 {
        let rate = i128::from(rate.max(1));
        (i128::from(self.0) * rate).div_euclid(i128::from(Self::TICKS_PER_SECOND)) as i64
    }

    /// Whether this time is greater than zero
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Whether this time is less than zero
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Absolute value
    pub fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Ratio `self / other` as a float
    pub fn ratio(self, other: Time) -> f64 {
        self.0 as f64 / other.0 as f64
    }
}

/// Divide rounding to nearest with ties to even; `d` must be positive
fn div_round_half_even(n: i128, d: i128) -> i128 {
    let q = n.div_euclid(d);
    let r = n.rem_euclid(d);
    match (2 * r).cmp(&d) {
        std::cmp::Ordering::Less => q,
        std::cmp::Ordering::Greater => q + 1,
        std::cmp::Ordering::Equal if q.rem_euclid(2) == 0 => q,
        std::cmp::Ordering::Equal => q + 1,
    }
}

impl Add for Time {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Time {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Neg for Time {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl AddAssign for Time {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Time {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_seconds())
    }
}

fn effective_scale(scale: f64) -> f64 {
    if scale.is_nan() || scale < MIN_SCALE {
        MIN_SCALE
    } else {
        scale
    }
}

/// Convert a horizontal pixel distance to time
pub fn to_time(pixels: f64, scale: f64) -> Time {
    Time::from_seconds(pixels / (SECOND_WIDTH * effective_scale(scale)))
}

/// Convert time to a horizontal pixel distance
pub fn to_pixels(time: Time, scale: f64) -> f64 {
    time.as_seconds() * SECOND_WIDTH * effective_scale(scale)
}

/// Snap to the nearest frame boundary at `rate`
pub fn round_to_rate(time: Time, rate: u32) -> Time {
    Time::from_frames(time.to_frames(rate), rate)
}

/// Snap down to the start of the containing frame at `rate`
pub fn floor_to_rate(time: Time, rate: u32) -> Time {
    Time::from_frames(time.floor_frames(rate), rate)
}

/// A half-open time range `[start, start + duration)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive start
    pub start: Time,
    /// Length of the range
    pub duration: Time,
}

impl TimeRange {
    /// Create a range
    pub fn new(start: Time, duration: Time) -> Self {
        Self { start, duration }
    }

    /// Create a range from its bounds
    pub fn from_bounds(start: Time, end: Time) -> Self {
        Self { start, duration: end - start }
    }

    /// Exclusive end
    pub fn end(&self) -> Time {
        self.start + self.duration
    }

    /// Whether `time` lies in the range
    pub fn contains(&self, time: Time) -> bool {
        self.start <= time && time < self.end()
    }

    /// Whether the ranges share any time. Ranges that only touch do not.
    pub fn intersects(&self, other: &TimeRange) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// Smallest range covering both
    pub fn union(&self, other: &TimeRange) -> TimeRange {
        TimeRange::from_bounds(self.start.min(other.start), self.end().max(other.end()))
    }
}

/// View state of a scene's timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineOptions {
    /// Horizontal zoom factor
    pub scale: f64,
    /// Scroll offset in pixels
    pub offset: DVec2,
    /// Number of layers available
    pub max_layer_count: u32,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: DVec2::ZERO,
            max_layer_count: 100,
        }
    }
}

impl TimelineOptions {
    /// Convert a screen position to content coordinates
    pub fn screen_to_content(&self, position: DVec2) -> DVec2 {
        position + self.offset
    }

    /// Convert content coordinates to a screen position
    pub fn content_to_screen(&self, position: DVec2) -> DVec2 {
        position - self.offset
    }

    /// Layer under a content-space y coordinate, clamped to the valid range
    pub fn pixel_to_layer(&self, y: f64) -> u32 {
        let last = self.max_layer_count.saturating_sub(1);
        if !y.is_finite() || y <= 0.0 {
            return 0;
        }
        let layer = (y / LAYER_HEIGHT).floor();
        if layer >= f64::from(last) {
            last
        } else {
            layer as u32
        }
    }

    /// Top of a layer row in content space
    pub fn layer_to_pixel(&self, layer: u32) -> f64 {
        f64::from(layer) * LAYER_HEIGHT
    }

    /// Time under a content-space x coordinate
    pub fn pixel_to_time(&self, x: f64) -> Time {
        to_time(x, self.scale)
    }

    /// Content-space x coordinate of a time
    pub fn time_to_pixel(&self, time: Time) -> f64 {
        to_pixels(time, self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_time_roundtrip() {
        for scale in [0.25, 0.5, 1.0, 2.0, 4.0] {
            for pixels in [0.0, 1.0, 37.5, 150.0, 1234.567, 98765.4] {
                let back = to_pixels(to_time(pixels, scale), scale);
                assert!((back - pixels).abs() < 1e-3, "scale {scale} pixels {pixels} -> {back}");
            }
        }
    }

    #[test]
    fn test_second_width() {
        assert_eq!(to_time(150.0, 1.0), Time::from_secs(1));
        assert_eq!(to_pixels(Time::from_secs(2), 0.5), 150.0);
    }

    #[test]
    fn test_invalid_scale_is_clamped() {
        assert_eq!(to_time(1.5e-2, 0.0), to_time(1.5e-2, MIN_SCALE));
        assert_eq!(to_time(1.0, f64::NAN), to_time(1.0, MIN_SCALE));
        assert_eq!(to_pixels(Time::from_secs(1), -3.0), to_pixels(Time::from_secs(1), MIN_SCALE));
    }

    #[test]
    fn test_round_to_rate_idempotent() {
        for rate in [1, 24, 25, 30, 60, 120] {
            for ticks in [-12_345_678, -1, 0, 1, 166_666, 333_333, 4_999_999, 123_456_789] {
                let once = round_to_rate(Time::from_ticks(ticks), rate);
                assert_eq!(round_to_rate(once, rate), once, "rate {rate} ticks {ticks}");
            }
        }
    }

    #[test]
    fn test_round_ties_to_even_frame() {
        // Half a frame at 10 fps is 0.05s
        assert_eq!(Time::from_seconds(0.05).to_frames(10), 0);
        assert_eq!(Time::from_seconds(0.15).to_frames(10), 2);
        assert_eq!(Time::from_seconds(0.16).to_frames(10), 2);
        assert_eq!(Time::from_seconds(-0.05).to_frames(10), 0);
    }

    #[test]
    fn test_frames() {
        assert_eq!(Time::from_frames(150, 30), Time::from_secs(5));
        assert_eq!(Time::from_secs(5).to_frames(30), 150);
        assert_eq!(floor_to_rate(Time::from_seconds(0.99), 1), Time::ZERO);
        assert_eq!(round_to_rate(Time::from_seconds(0.99), 1), Time::from_secs(1));
    }

    #[test]
    fn test_range_half_open() {
        let a = TimeRange::new(Time::ZERO, Time::from_secs(5));
        let b = TimeRange::new(Time::from_secs(5), Time::from_secs(5));
        assert!(a.contains(Time::ZERO));
        assert!(!a.contains(Time::from_secs(5)));
        assert!(!a.intersects(&b));
        assert!(a.intersects(&TimeRange::new(Time::from_seconds(4.9), Time::from_secs(1))));
        assert_eq!(a.union(&b), TimeRange::new(Time::ZERO, Time::from_secs(10)));
    }

    #[test]
    fn test_layer_conversion() {
        let options = TimelineOptions { max_layer_count: 4, ..Default::default() };
        assert_eq!(options.pixel_to_layer(-10.0), 0);
        assert_eq!(options.pixel_to_layer(24.9), 0);
        assert_eq!(options.pixel_to_layer(25.0), 1);
        assert_eq!(options.pixel_to_layer(10_000.0), 3);
        assert_eq!(options.layer_to_pixel(2), 50.0);
    }
}
