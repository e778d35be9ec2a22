//! Fixed-size RGB pixel canvas the game draws into each frame.
//!
//! The canvas is always 640x480 logical pixels; how those pixels reach the
//! terminal is the presenter's problem (see `screen`).

pub const WIDTH: i32 = 640;
pub const HEIGHT: i32 = 480;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const BLACK: Rgb = Rgb(0, 0, 0);
pub const WHITE: Rgb = Rgb(255, 255, 255);

impl Rgb {
    /// Blend `over` onto `self` with the given opacity (0 = self, 255 = over).
    pub fn blend(self, over: Rgb, alpha: u8) -> Rgb {
        Rgb(
            mix(self.0, over.0, alpha),
            mix(self.1, over.1, alpha),
            mix(self.2, over.2, alpha),
        )
    }
}

fn mix(a: u8, b: u8, alpha: u8) -> u8 {
    (a as i32 + (b as i32 - a as i32) * alpha as i32 / 255) as u8
}

/// Axis-aligned rectangle in canvas coordinates. Half-open on both axes,
/// so a 200-wide rect at x=110 covers columns 110..=309.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }
}

pub struct Canvas {
    px: Vec<Rgb>,
}

impl Canvas {
    pub fn new() -> Self {
        Canvas {
            px: vec![BLACK; (WIDTH * HEIGHT) as usize],
        }
    }

    pub fn fill(&mut self, color: Rgb) {
        self.px.fill(color);
    }

    pub fn set(&mut self, x: i32, y: i32, color: Rgb) {
        if x >= 0 && x < WIDTH && y >= 0 && y < HEIGHT {
            self.px[(y * WIDTH + x) as usize] = color;
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Rgb {
        debug_assert!(x >= 0 && x < WIDTH && y >= 0 && y < HEIGHT);
        self.px[(y * WIDTH + x) as usize]
    }

    pub fn fill_rect(&mut self, r: Rect, color: Rgb) {
        for y in r.y..r.y + r.h {
            for x in r.x..r.x + r.w {
                self.set(x, y, color);
            }
        }
    }

    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgb) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Blend `color` over every pixel inside `r` at the given opacity.
    pub fn blend_rect(&mut self, r: Rect, color: Rgb, alpha: u8) {
        let x0 = r.x.max(0);
        let y0 = r.y.max(0);
        let x1 = (r.x + r.w).min(WIDTH);
        let y1 = (r.y + r.h).min(HEIGHT);
        for y in y0..y1 {
            for x in x0..x1 {
                let i = (y * WIDTH + x) as usize;
                self.px[i] = self.px[i].blend(color, alpha);
            }
        }
    }

    /// Blend `color` over the whole canvas at the given opacity.
    pub fn blend_all(&mut self, color: Rgb, alpha: u8) {
        for p in &mut self.px {
            *p = p.blend(color, alpha);
        }
    }
}

// 3x5 glyphs, row-major, one byte per pixel. Digits first, then the letters
// the HUD needs. Glyphs are scaled up at draw time.
const GLYPH_W: i32 = 3;
const GLYPH_H: i32 = 5;

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

#[rustfmt::skip]
fn letter(ch: char) -> Option<[u8; 15]> {
    Some(match ch {
        'A' => [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,0,1],
        'C' => [1,1,1, 1,0,0, 1,0,0, 1,0,0, 1,1,1],
        'E' => [1,1,1, 1,0,0, 1,1,0, 1,0,0, 1,1,1],
        'H' => [1,0,1, 1,0,1, 1,1,1, 1,0,1, 1,0,1],
        'M' => [1,0,1, 1,1,1, 1,1,1, 1,0,1, 1,0,1],
        'N' => [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,0,1],
        'O' => [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1],
        'P' => [1,1,1, 1,0,1, 1,1,1, 1,0,0, 1,0,0],
        'Q' => [1,1,1, 1,0,1, 1,0,1, 1,1,1, 0,0,1],
        'R' => [1,1,1, 1,0,1, 1,1,0, 1,0,1, 1,0,1],
        'S' => [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1],
        'T' => [1,1,1, 0,1,0, 0,1,0, 0,1,0, 0,1,0],
        'W' => [1,0,1, 1,0,1, 1,1,1, 1,1,1, 1,0,1],
        _ => return None,
    })
}

fn glyph(ch: char) -> Option<[u8; 15]> {
    match ch {
        '0'..='9' => Some(DIGITS[ch as usize - '0' as usize]),
        _ => letter(ch.to_ascii_uppercase()),
    }
}

fn draw_glyph(canvas: &mut Canvas, x: i32, y: i32, bits: &[u8; 15], scale: i32, color: Rgb) {
    for gy in 0..GLYPH_H {
        for gx in 0..GLYPH_W {
            if bits[(gy * GLYPH_W + gx) as usize] != 0 {
                canvas.fill_rect(
                    Rect::new(x + gx * scale, y + gy * scale, scale, scale),
                    color,
                );
            }
        }
    }
}

/// Draw `text` with its top-left corner at (x, y). Unknown characters
/// (including spaces) just advance the cursor.
pub fn draw_text(canvas: &mut Canvas, x: i32, y: i32, text: &str, scale: i32, color: Rgb) {
    let mut cx = x;
    for ch in text.chars() {
        if let Some(bits) = glyph(ch) {
            draw_glyph(canvas, cx, y, &bits, scale, color);
        }
        cx += (GLYPH_W + 1) * scale;
    }
}

/// Width in pixels of `text` at `scale`, without the trailing gap.
pub fn text_width(text: &str, scale: i32) -> i32 {
    let n = text.chars().count() as i32;
    if n == 0 {
        return 0;
    }
    n * (GLYPH_W + 1) * scale - scale
}
