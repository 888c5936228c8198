use spinwheel_abi::Color32;

/// Something the wheel can be painted on.
///
/// Only `put_pixel` is required. Out-of-bounds writes are ignored, so
/// callers never clip.
pub trait Surface {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn put_pixel(&mut self, x: i32, y: i32, color: Color32);

    /// Clamp a span on `row` to the surface, or `None` when nothing is left.
    #[inline]
    fn clip_row_span(&self, row: i32, x0: i32, x1: i32) -> Option<(i32, i32, i32)> {
        if row < 0 || row >= self.height() as i32 {
            return None;
        }
        let x0 = x0.max(0);
        let x1 = x1.min(self.width() as i32 - 1);
        if x0 > x1 { None } else { Some((row, x0, x1)) }
    }

    /// Fill columns `x0..=x1` of `row`.
    #[inline]
    fn fill_row_span(&mut self, row: i32, x0: i32, x1: i32, color: Color32) {
        let Some((row, x0, x1)) = self.clip_row_span(row, x0, x1) else {
            return;
        };
        for x in x0..=x1 {
            self.put_pixel(x, row, color);
        }
    }

    #[inline]
    fn hline(&mut self, x0: i32, x1: i32, y: i32, color: Color32) {
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        self.fill_row_span(y, x0, x1, color);
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color32) {
        if w <= 0 || h <= 0 {
            return;
        }
        for row in y..y + h {
            self.fill_row_span(row, x, x + w - 1, color);
        }
    }

    fn clear(&mut self, color: Color32) {
        let (w, h) = (self.width() as i32, self.height() as i32);
        self.fill_rect(0, 0, w, h, color);
    }
}

/// Owned 0xAARRGGBB pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    #[inline]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color32> {
        self.offset(x, y).map(|i| Color32(self.pixels[i]))
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Binary PPM (`P6`), alpha dropped.
    pub fn to_ppm(&self) -> Vec<u8> {
        let header = format!("P6\n{} {}\n255\n", self.width, self.height);
        let mut out = Vec::with_capacity(header.len() + self.pixels.len() * 3);
        out.extend_from_slice(header.as_bytes());
        for &raw in &self.pixels {
            let c = Color32(raw);
            out.extend_from_slice(&[c.red(), c.green(), c.blue()]);
        }
        out
    }
}

impl Surface for Canvas {
    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn put_pixel(&mut self, x: i32, y: i32, color: Color32) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i] = color.0;
        }
    }

    fn fill_row_span(&mut self, row: i32, x0: i32, x1: i32, color: Color32) {
        let Some((row, x0, x1)) = self.clip_row_span(row, x0, x1) else {
            return;
        };
        let start = row as usize * self.width as usize;
        self.pixels[start + x0 as usize..=start + x1 as usize].fill(color.0);
    }
}
