//! Integer raster primitives over any [`Surface`].

use spinwheel_abi::Color32;

use crate::canvas::Surface;

/// Bresenham line, endpoints included.
pub fn line<S: Surface + ?Sized>(target: &mut S, x0: i32, y0: i32, x1: i32, y1: i32, color: Color32) {
    let w = target.width() as i32;
    let h = target.height() as i32;
    if (x0 < 0 && x1 < 0) || (y0 < 0 && y1 < 0) || (x0 >= w && x1 >= w) || (y0 >= h && y1 >= h) {
        return;
    }

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        target.put_pixel(x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Midpoint circle outline.
pub fn circle<S: Surface + ?Sized>(target: &mut S, cx: i32, cy: i32, radius: i32, color: Color32) {
    if radius <= 0 {
        return;
    }
    let (mut x, mut y, mut d) = (0i32, radius, 1 - radius);
    while x <= y {
        for (px, py) in [(x, y), (-x, y), (x, -y), (-x, -y), (y, x), (-y, x), (y, -x), (-y, -x)] {
            target.put_pixel(cx + px, cy + py, color);
        }
        x += 1;
        if d < 0 {
            d += 2 * x + 1;
        } else {
            y -= 1;
            d += 2 * (x - y) + 1;
        }
    }
}

pub fn circle_filled<S: Surface + ?Sized>(target: &mut S, cx: i32, cy: i32, radius: i32, color: Color32) {
    if radius <= 0 {
        return;
    }
    let (mut x, mut y, mut d) = (0i32, radius, 1 - radius);
    target.hline(cx - radius, cx + radius, cy, color);

    while x < y {
        x += 1;
        if d < 0 {
            d += 2 * x + 1;
        } else {
            target.hline(cx - x + 1, cx + x - 1, cy + y, color);
            target.hline(cx - x + 1, cx + x - 1, cy - y, color);
            y -= 1;
            d += 2 * (x - y) + 1;
        }
        target.hline(cx - y, cx + y, cy + x, color);
        target.hline(cx - y, cx + y, cy - x, color);
    }
}

/// Scanline triangle fill with 16.16 fixed-point edge stepping.
pub fn triangle_filled<S: Surface + ?Sized>(
    target: &mut S,
    (mut x0, mut y0): (i32, i32),
    (mut x1, mut y1): (i32, i32),
    (mut x2, mut y2): (i32, i32),
    color: Color32,
) {
    if y0 > y1 {
        core::mem::swap(&mut y0, &mut y1);
        core::mem::swap(&mut x0, &mut x1);
    }
    if y1 > y2 {
        core::mem::swap(&mut y1, &mut y2);
        core::mem::swap(&mut x1, &mut x2);
    }
    if y0 > y1 {
        core::mem::swap(&mut y0, &mut y1);
        core::mem::swap(&mut x0, &mut x1);
    }

    let total_height = y2 - y0;
    if total_height == 0 {
        let lo = x0.min(x1).min(x2);
        let hi = x0.max(x1).max(x2);
        target.hline(lo, hi, y0, color);
        return;
    }

    for y in y0..=y2 {
        let second_half = y > y1 || y1 == y0;
        let segment_height = if second_half { y2 - y1 } else { y1 - y0 };
        if segment_height == 0 {
            continue;
        }
        let dy = y - if second_half { y1 } else { y0 };
        let alpha = (y - y0) as i64 * 65536 / total_height as i64;
        let beta = dy as i64 * 65536 / segment_height as i64;

        let ax = x0 + (((x2 - x0) as i64 * alpha) >> 16) as i32;
        let bx = if second_half {
            x1 + (((x2 - x1) as i64 * beta) >> 16) as i32
        } else {
            x0 + (((x1 - x0) as i64 * beta) >> 16) as i32
        };
        target.hline(ax, bx, y, color);
    }
}
