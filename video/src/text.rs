//! Plain text rendering of a wheel for terminals and logs.

use core::fmt::Write as _;

use spinwheel_abi::{WheelFlags, WheelView};
use spinwheel_core::angle::normalize_degrees;
use spinwheel_core::slice_at_pointer;

#[derive(Clone, Copy, Debug)]
pub struct TextOptions {
    /// Slice rows to print; the window is centered on the pointer.
    pub max_rows: usize,
    pub show_colors: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            max_rows: 24,
            show_colors: true,
        }
    }
}

fn state_name(flags: WheelFlags) -> &'static str {
    if flags.contains(WheelFlags::SPINNING) {
        "spinning"
    } else if flags.contains(WheelFlags::RESULT_SHOWN) {
        "result"
    } else {
        "idle"
    }
}

/// One header line, then one line per slice. The slice under the pointer is
/// marked with `>`.
pub fn render_text(view: &WheelView, options: &TextOptions) -> String {
    let count = view.visible_batch.len();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} slices  rotation {:.1}  {}",
        count,
        normalize_degrees(view.rotation),
        state_name(view.flags)
    );
    if let Some(image) = &view.center_image {
        let _ = writeln!(out, "center image: {} bytes", image.len());
    }
    if count == 0 || options.max_rows == 0 {
        return out;
    }

    let pointer = slice_at_pointer(view.rotation, count);
    let rows = options.max_rows.min(count);
    let first = if rows == count {
        0
    } else {
        (pointer + count - rows / 2) % count
    };
    let width = count.to_string().len();

    for offset in 0..rows {
        let index = (first + offset) % count;
        let marker = if index == pointer { '>' } else { ' ' };
        let label = view.visible_batch[index].label();
        let _ = write!(out, "{} [{:>width$}] {}", marker, index, label, width = width);
        if options.show_colors {
            if let Some(color) = view.colors.get(index) {
                let _ = write!(out, "  {}", color.fill);
            }
        }
        out.push('\n');
    }
    if rows < count {
        let _ = writeln!(out, "  ... {} more", count - rows);
    }
    out
}
