//! Screen placement of the wheel.
//!
//! Screen angles are clockwise from the +x axis with y growing downward. The
//! pointer sits at screen angle 0, so a wheel angle `a` rotated by `R`
//! appears at screen angle `a + R`.

use spinwheel_core::angle::{normalize_degrees, slice_center, slice_start, slice_width};

/// Pixel layout of one wheel on a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WheelLayout {
    pub cx: i32,
    pub cy: i32,
    pub radius: i32,
    pub hub_radius: i32,
    pub pointer_len: i32,
    pub pointer_half_width: i32,
}

impl WheelLayout {
    /// Largest centered wheel that leaves room for the pointer.
    pub fn fit(width: u32, height: u32) -> Self {
        let side = width.min(height) as i32;
        let radius = (side / 2 - side / 16).max(1);
        let pointer_len = (radius / 8).max(4);
        Self {
            cx: width as i32 / 2,
            cy: height as i32 / 2,
            radius,
            hub_radius: (radius / 8).max(2),
            pointer_len,
            pointer_half_width: (pointer_len / 2).max(2),
        }
    }

    /// Pixel at `distance` from the center along `screen_deg`.
    pub fn point_at(&self, screen_deg: f64, distance: f64) -> (i32, i32) {
        let rad = screen_deg.to_radians();
        (
            self.cx + (distance * rad.cos()).round() as i32,
            self.cy + (distance * rad.sin()).round() as i32,
        )
    }

    /// Wheel angle painted at pixel `(x, y)`, or `None` off the face.
    pub fn wheel_angle_at(&self, x: i32, y: i32, rotation: f64) -> Option<f64> {
        let dx = (x - self.cx) as f64;
        let dy = (y - self.cy) as f64;
        let r = self.radius as f64;
        if dx * dx + dy * dy > r * r {
            return None;
        }
        let screen = dy.atan2(dx).to_degrees();
        Some(normalize_degrees(screen - rotation))
    }

    pub fn slice_start_on_screen(index: usize, count: usize, rotation: f64) -> f64 {
        normalize_degrees(slice_start(index, count) + rotation)
    }

    pub fn slice_center_on_screen(index: usize, count: usize, rotation: f64) -> f64 {
        normalize_degrees(slice_center(index, count) + rotation)
    }

    /// Where a slice label starts: on the slice's center line, a little out
    /// from the hub.
    pub fn label_anchor(&self, index: usize, count: usize, rotation: f64) -> (i32, i32) {
        let distance = self.hub_radius as f64 + (self.radius - self.hub_radius) as f64 * 0.15;
        self.point_at(Self::slice_center_on_screen(index, count, rotation), distance)
    }

    /// Subdivision step for drawing one slice as a triangle fan.
    pub fn fan_steps(count: usize) -> usize {
        (slice_width(count) / 4.0).ceil().max(1.0) as usize
    }
}
