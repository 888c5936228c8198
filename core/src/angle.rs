//! Wheel geometry in degrees.
//!
//! Screen convention: the pointer sits at 0°. Slice `i` of `n` covers
//! `[i*w - 90, (i+1)*w - 90)` with `w = 360 / n`, so slice 0 starts at the
//! top of the wheel. Rotating the wheel clockwise by `R` brings the wheel
//! angle `(360 - R) mod 360` under the pointer.

pub const FULL_TURN: f64 = 360.0;
pub const HALF_TURN: f64 = 180.0;

/// Wheel angle where slice 0 begins.
pub const SLICE_ORIGIN: f64 = -90.0;

/// Largest accepted mismatch between a planned landing and its slice center.
pub const CENTER_TOLERANCE: f64 = 0.1;

/// Map any angle into `[0, 360)`.
#[inline]
pub fn normalize_degrees(angle: f64) -> f64 {
    let r = angle.rem_euclid(FULL_TURN);
    // rem_euclid rounds tiny negatives up to exactly 360.
    if r >= FULL_TURN { 0.0 } else { r }
}

#[inline]
pub fn slice_width(count: usize) -> f64 {
    FULL_TURN / count.max(1) as f64
}

#[inline]
pub fn slice_start(index: usize, count: usize) -> f64 {
    normalize_degrees(index as f64 * slice_width(count) + SLICE_ORIGIN)
}

#[inline]
pub fn slice_end(index: usize, count: usize) -> f64 {
    normalize_degrees((index + 1) as f64 * slice_width(count) + SLICE_ORIGIN)
}

#[inline]
pub fn slice_center(index: usize, count: usize) -> f64 {
    let w = slice_width(count);
    normalize_degrees(index as f64 * w + SLICE_ORIGIN + w / 2.0)
}

/// Rotation (mod 360) that brings `wheel_angle` under the pointer.
#[inline]
pub fn rotation_for_wheel_angle(wheel_angle: f64) -> f64 {
    normalize_degrees(FULL_TURN - wheel_angle)
}

/// Wheel angle under the pointer for a given rotation.
#[inline]
pub fn pointer_angle(rotation: f64) -> f64 {
    normalize_degrees(FULL_TURN - normalize_degrees(rotation))
}

/// Unsigned distance on the circle, in `[0, 180]`.
#[inline]
pub fn circular_distance(a: f64, b: f64) -> f64 {
    let d = normalize_degrees(a - b);
    d.min(FULL_TURN - d)
}

/// Signed adjustment in `(-180, 180]` that turns `from` into `to` mod 360.
#[inline]
pub fn shortest_adjustment(from: f64, to: f64) -> f64 {
    let d = normalize_degrees(to - from);
    if d > HALF_TURN { d - FULL_TURN } else { d }
}

/// Whether `angle` lies in the half-open arc `[start, end)`.
///
/// `start >= end` is an arc that wraps through 0°; `start == end` is the full
/// circle (a single-slice wheel).
#[inline]
pub fn arc_contains(start: f64, end: f64, angle: f64) -> bool {
    if start < end {
        angle >= start && angle < end
    } else {
        angle >= start || angle < end
    }
}
