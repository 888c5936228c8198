//! Wedge colors.
//!
//! Colors follow batch position, so the same entry may change color between
//! resamples. The winner's color index is taken from its slice.

use spinwheel_abi::{Color32, SliceColor};

use crate::resolver::slice_at_pointer;

pub const PALETTE: [Color32; 4] = [
    Color32::rgb(0xef, 0xb7, 0x1d),
    Color32::rgb(0x24, 0xa6, 0x43),
    Color32::rgb(0x4d, 0x7c, 0xeb),
    Color32::rgb(0xd8, 0x21, 0x35),
];

#[inline]
pub fn color_index(slice: usize) -> usize {
    slice % PALETTE.len()
}

/// Fill plus a label color readable on it: black on yellow and green,
/// white on blue and red.
pub fn slice_color(slice: usize) -> SliceColor {
    let index = color_index(slice);
    let text = if index < 2 { Color32::BLACK } else { Color32::WHITE };
    SliceColor {
        fill: PALETTE[index],
        text,
    }
}

pub fn batch_colors(count: usize) -> Vec<SliceColor> {
    (0..count).map(slice_color).collect()
}

/// Pointer color: the fill of the slice under it, or gold when the wheel is
/// empty or the pointer is set not to follow.
pub fn pointer_color(rotation: f64, count: usize, follow_slice: bool) -> Color32 {
    if !follow_slice || count == 0 {
        return Color32::GOLD;
    }
    PALETTE[color_index(slice_at_pointer(rotation, count))]
}
