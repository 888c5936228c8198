//! Rasterizes a [`WheelView`].

use spinwheel_abi::{Color32, ImageSize, Theme, WheelView};
use spinwheel_core::angle::slice_width;
use spinwheel_core::palette::slice_color;
use spinwheel_lib::klog_trace;

use crate::canvas::Surface;
use crate::geometry::WheelLayout;
use crate::primitives::{circle, circle_filled, line, triangle_filled};

pub const RIM_COLOR: Color32 = Color32::rgb(0xCD, 0x85, 0x3F);
pub const HUB_COLOR: Color32 = Color32::rgb(0xFF, 0xD7, 0x00);
pub const DIVIDER_COLOR: Color32 = Color32::rgb(0xFF, 0xFF, 0xFF);
pub const EMPTY_FACE_COLOR: Color32 = Color32::rgb(0x5A, 0x5A, 0x5A);

/// Dividers are skipped once slices get thinner than this at the rim.
const MIN_DIVIDER_ARC_PX: f64 = 6.0;

pub fn theme_background(theme: Theme) -> Color32 {
    match theme {
        Theme::Night => Color32::rgb(0x12, 0x12, 0x12),
        Theme::Normal => Color32::rgb(0xF0, 0xF0, 0xF0),
        Theme::Light => Color32::rgb(0xFF, 0xFF, 0xFF),
    }
}

pub struct WheelRenderer {
    layout: WheelLayout,
    theme: Theme,
    image_size: ImageSize,
}

impl WheelRenderer {
    pub fn new(layout: WheelLayout, theme: Theme) -> Self {
        Self {
            layout,
            theme,
            image_size: ImageSize::default(),
        }
    }

    pub fn with_image_size(mut self, image_size: ImageSize) -> Self {
        self.image_size = image_size;
        self
    }

    pub fn layout(&self) -> &WheelLayout {
        &self.layout
    }

    /// Radius of the center disc for `view`.
    pub fn hub_radius(&self, view: &WheelView) -> i32 {
        if view.center_image.is_some() {
            (self.layout.radius as f64 * self.image_size.radius_share()).round() as i32
        } else {
            self.layout.hub_radius
        }
    }

    /// Paint one full frame.
    pub fn render<S: Surface + ?Sized>(&self, view: &WheelView, target: &mut S) {
        let l = &self.layout;
        let count = view.visible_batch.len();
        klog_trace!("render: {} slices at {:.2}", count, view.rotation);

        target.clear(theme_background(self.theme));
        let rim = (l.radius / 40).max(1);
        circle_filled(target, l.cx, l.cy, l.radius + rim, RIM_COLOR);

        if count == 0 {
            circle_filled(target, l.cx, l.cy, l.radius, EMPTY_FACE_COLOR);
        } else {
            for index in 0..count {
                let fill = view
                    .colors
                    .get(index)
                    .map(|c| c.fill)
                    .unwrap_or_else(|| slice_color(index).fill);
                self.draw_slice(target, index, count, view.rotation, fill);
            }
            let arc_px = slice_width(count).to_radians() * l.radius as f64;
            if count > 1 && arc_px >= MIN_DIVIDER_ARC_PX {
                for index in 0..count {
                    let angle = WheelLayout::slice_start_on_screen(index, count, view.rotation);
                    let (x, y) = l.point_at(angle, l.radius as f64);
                    line(target, l.cx, l.cy, x, y, DIVIDER_COLOR);
                }
            }
        }

        let hub = self.hub_radius(view);
        if view.center_image.is_some() {
            circle_filled(target, l.cx, l.cy, hub, Color32::WHITE);
            circle(target, l.cx, l.cy, hub, RIM_COLOR);
        } else {
            circle_filled(target, l.cx, l.cy, hub, HUB_COLOR);
        }

        self.draw_pointer(target, view.pointer_color);
    }

    fn draw_slice<S: Surface + ?Sized>(&self, target: &mut S, index: usize, count: usize, rotation: f64, fill: Color32) {
        let l = &self.layout;
        let start = WheelLayout::slice_start_on_screen(index, count, rotation);
        let width = slice_width(count);
        let steps = WheelLayout::fan_steps(count);
        let r = l.radius as f64;
        for step in 0..steps {
            let a0 = start + width * step as f64 / steps as f64;
            let a1 = start + width * (step + 1) as f64 / steps as f64;
            triangle_filled(target, (l.cx, l.cy), l.point_at(a0, r), l.point_at(a1, r), fill);
        }
    }

    /// Arrow at screen angle 0, tip pointing at the center.
    fn draw_pointer<S: Surface + ?Sized>(&self, target: &mut S, color: Color32) {
        let l = &self.layout;
        let half_len = l.pointer_len / 2;
        let tip = (l.cx + l.radius - half_len, l.cy);
        let base_x = l.cx + l.radius + half_len;
        triangle_filled(
            target,
            tip,
            (base_x, l.cy - l.pointer_half_width),
            (base_x, l.cy + l.pointer_half_width),
            color,
        );
    }
}
