//! Wheel presentation: a software rasterizer for the wheel face and a plain
//! text renderer for terminals.

pub mod canvas;
pub mod geometry;
pub mod primitives;
pub mod render;
pub mod text;


pub use canvas::{Canvas, Surface};
pub use geometry::WheelLayout;
pub use render::{WheelRenderer, theme_background};
pub use text::{TextOptions, render_text};
