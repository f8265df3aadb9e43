//! Software drawing into an RGBA8 framebuffer: clipped pixels, rects, lines,
//! and a 3x5 bitmap font.
//!
//! Glyphs are packed one octal digit per row, top row first. Within a row,
//! `4` is the left column, `2` the middle, `1` the right.

pub(crate) const GLYPH_WIDTH: i32 = 3;
pub(crate) const GLYPH_HEIGHT: i32 = 5;

pub(crate) struct Canvas<'a> {
    frame: &'a mut [u8],
    width: i32,
    height: i32,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width: width.min(i32::MAX as u32) as i32,
            height: height.min(i32::MAX as u32) as i32,
        }
    }

    pub(crate) fn width(&self) -> i32 {
        self.width
    }

    pub(crate) fn height(&self) -> i32 {
        self.height
    }

    pub(crate) fn clear(&mut self, color: [u8; 4]) {
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    /// Alpha-blends `color` over the existing pixel. Out-of-bounds writes are dropped.
    pub(crate) fn blend_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let Some(dst) = self.frame.get_mut(offset..offset + 4) else {
            return;
        };
        let alpha = color[3] as u32;
        if alpha == 255 {
            dst.copy_from_slice(&color);
            return;
        }
        for channel in 0..3 {
            let src = color[channel] as u32;
            let old = dst[channel] as u32;
            dst[channel] = ((src * alpha + old * (255 - alpha)) / 255) as u8;
        }
        dst[3] = 255;
    }

    pub(crate) fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: [u8; 4]) {
        let start_x = x.max(0);
        let start_y = y.max(0);
        let end_x = x.saturating_add(w).min(self.width);
        let end_y = y.saturating_add(h).min(self.height);
        for py in start_y..end_y {
            for px in start_x..end_x {
                self.blend_pixel(px, py, color);
            }
        }
    }

    pub(crate) fn rect_outline(&mut self, x: i32, y: i32, w: i32, h: i32, color: [u8; 4]) {
        if w <= 1 || h <= 1 {
            return;
        }
        self.fill_rect(x, y, w, 1, color);
        self.fill_rect(x, y + h - 1, w, 1, color);
        self.fill_rect(x, y + 1, 1, h - 2, color);
        self.fill_rect(x + w - 1, y + 1, 1, h - 2, color);
    }

    pub(crate) fn line(&mut self, from: (i32, i32), to: (i32, i32), color: [u8; 4]) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let step_x = if x < to.0 { 1 } else { -1 };
        let step_y = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.blend_pixel(x, y, color);
            if x == to.0 && y == to.1 {
                break;
            }
            let doubled = 2 * err;
            if doubled >= dy {
                err += dy;
                x += step_x;
            }
            if doubled <= dx {
                err += dx;
                y += step_y;
            }
        }
    }

    /// Draws `text` with its top-left corner at (`x`, `y`). Lowercase is
    /// rendered as uppercase; unknown characters draw as `?`.
    pub(crate) fn text(&mut self, x: i32, y: i32, text: &str, scale: i32, color: [u8; 4]) {
        let scale = scale.max(1);
        let mut cursor = x;
        for ch in text.chars() {
            self.glyph(cursor, y, glyph_bits(ch), scale, color);
            cursor += glyph_advance(scale);
        }
    }

    fn glyph(&mut self, x: i32, y: i32, bits: u16, scale: i32, color: [u8; 4]) {
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if !glyph_cell(bits, row, col) {
                    continue;
                }
                self.fill_rect(x + col * scale, y + row * scale, scale, scale, color);
            }
        }
    }
}

pub(crate) fn glyph_advance(scale: i32) -> i32 {
    (GLYPH_WIDTH + 1) * scale.max(1)
}

pub(crate) fn line_advance(scale: i32) -> i32 {
    (GLYPH_HEIGHT + 2) * scale.max(1)
}

pub(crate) fn text_width(text: &str, scale: i32) -> i32 {
    let chars = text.chars().count() as i32;
    if chars == 0 {
        return 0;
    }
    chars * glyph_advance(scale) - scale.max(1)
}

fn glyph_cell(bits: u16, row: i32, col: i32) -> bool {
    let shift = (GLYPH_HEIGHT - 1 - row) * 3 + (GLYPH_WIDTH - 1 - col);
    (bits >> shift) & 1 == 1
}

const UNKNOWN_GLYPH: u16 = 0o61202;

fn glyph_bits(ch: char) -> u16 {
    match ch.to_ascii_uppercase() {
        ' ' => 0,
        'A' => 0o25755,
        'B' => 0o65656,
        'C' => 0o34443,
        'D' => 0o65556,
        'E' => 0o74647,
        'F' => 0o74644,
        'G' => 0o34553,
        'H' => 0o55755,
        'I' => 0o72227,
        'J' => 0o11152,
        'K' => 0o55655,
        'L' => 0o44447,
        'M' => 0o57755,
        'N' => 0o65555,
        'O' => 0o25552,
        'P' => 0o65644,
        'Q' => 0o25563,
        'R' => 0o65655,
        'S' => 0o34216,
        'T' => 0o72222,
        'U' => 0o55557,
        'V' => 0o55552,
        'W' => 0o55775,
        'X' => 0o55255,
        'Y' => 0o55222,
        'Z' => 0o71247,
        '0' => 0o75557,
        '1' => 0o26227,
        '2' => 0o61247,
        '3' => 0o61216,
        '4' => 0o55711,
        '5' => 0o74616,
        '6' => 0o34652,
        '7' => 0o71222,
        '8' => 0o25252,
        '9' => 0o25316,
        '!' => 0o22202,
        '.' => 0o00002,
        ',' => 0o00024,
        ':' => 0o02020,
        '-' => 0o00700,
        '+' => 0o02720,
        '/' => 0o11244,
        '[' => 0o64446,
        ']' => 0o31113,
        '(' => 0o12221,
        ')' => 0o42224,
        '\'' => 0o22000,
        '=' => 0o07070,
        '%' => 0o51245,
        '_' => 0o00007,
        '<' => 0o12421,
        '>' => 0o42124,
        '#' => 0o57575,
        _ => UNKNOWN_GLYPH,
    }
}
