//! String measurement and anchored drawing

use crate::canvas::Canvas;
use crate::font::{FixedFont, Font};
use crate::sink::DisplaySink;

/// Anchor of a string drawn with [`Canvas::draw_string`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Datum {
    #[default]
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Datum {
    /// Offset of the top-left corner from the anchor
    fn offset(self, w: i32, h: i32) -> (i32, i32) {
        use Datum::*;
        let dx = match self {
            TopLeft | MiddleLeft | BottomLeft => 0,
            TopCenter | MiddleCenter | BottomCenter => -(w / 2),
            TopRight | MiddleRight | BottomRight => -w,
        };
        let dy = match self {
            TopLeft | TopCenter | TopRight => 0,
            MiddleLeft | MiddleCenter | MiddleRight => -(h / 2),
            BottomLeft | BottomCenter | BottomRight => -h,
        };
        (dx, dy)
    }
}

impl<S: DisplaySink> Canvas<S> {
    /// Height of one text line in the current font
    pub fn line_height(&self) -> i32 {
        match self.text.font {
            Font::Builtin | Font::Fixed(_) => FixedFont::CELL_HEIGHT * self.text.size_y,
            Font::Packed(font) => font.line_space as i32,
            Font::Gfx(font) => font.y_advance as i32 * self.text.size_y,
        }
    }

    /// Width in pixels of the longest line of `text`
    pub fn str_pixel_len(&self, text: &str) -> i32 {
        let font = match self.text.font {
            Font::Gfx(_) => {
                let (x, y) = self.cursor();
                return self.text_bounds(text, x, y).2;
            }
            Font::Packed(font) => Some(font),
            Font::Builtin | Font::Fixed(_) => None,
        };
        let (mut len, mut max) = (0, 0);
        for c in text.bytes() {
            if c == b'\n' {
                max = max.max(len);
                len = 0;
                continue;
            }
            len += match font {
                Some(font) => font.glyph(c as u32).map_or(0, |g| g.delta as i32),
                None => FixedFont::CELL_WIDTH * self.text.size_x,
            };
        }
        max.max(len)
    }

    /// Bounding box `(x, y, w, h)` of `text` written from `(x, y)`
    ///
    /// Follows the wrap setting. Empty text gives a zero size at `(x, y)`.
    pub fn text_bounds(&self, text: &str, x: i32, y: i32) -> (i32, i32, i32, i32) {
        self.bounds_of(text.as_bytes(), x, y)
    }

    pub(super) fn bounds_of(&self, bytes: &[u8], x: i32, y: i32) -> (i32, i32, i32, i32) {
        let mut b = Bounds {
            x,
            y,
            min_x: self.width(),
            min_y: self.height(),
            max_x: -1,
            max_y: -1,
        };
        for &c in bytes {
            if c != b'\r' {
                self.char_bounds(c, &mut b);
            }
        }
        let (mut x1, mut y1, mut w, mut h) = (x, y, 0, 0);
        if b.max_x >= b.min_x {
            x1 = b.min_x;
            w = b.max_x - b.min_x + 1;
        }
        if b.max_y >= b.min_y {
            y1 = b.min_y;
            h = b.max_y - b.min_y + 1;
        }
        (x1, y1, w, h)
    }

    fn char_bounds(&self, c: u8, b: &mut Bounds) {
        let t = &self.text;
        let (sx, sy) = (t.size_x, t.size_y);
        match t.font {
            Font::Packed(font) => {
                if c == b'\n' {
                    b.x = 0;
                    b.y += font.line_space as i32;
                    return;
                }
                let Some(g) = font.glyph(c as u32) else {
                    return;
                };
                let (w, h) = (g.width as i32, g.height as i32);
                if t.wrap && b.x + g.xoffset + w > self.width() {
                    b.x = 0;
                    b.y += font.line_space as i32;
                }
                let x1 = b.x + g.xoffset;
                let y1 = b.y + font.cap_height as i32 - h - g.yoffset;
                b.include(x1, y1, x1 + w - 1, y1 + h - 1);
                b.x += g.delta as i32;
            }
            Font::Gfx(font) => {
                let y_advance = font.y_advance as i32;
                if c == b'\n' {
                    b.x = 0;
                    b.y += sy * y_advance;
                    return;
                }
                let Some(g) = font.glyph(c as u32) else {
                    return;
                };
                let (w, h) = (g.width as i32, g.height as i32);
                let xo = g.x_offset as i32;
                let yo = g.y_offset as i32 + y_advance / 2;
                if t.wrap && b.x + (xo + w) * sx > self.width() {
                    b.x = 0;
                    b.y += sy * y_advance;
                }
                let x1 = b.x + xo * sx;
                let y1 = b.y + yo * sy;
                b.include(x1, y1, x1 + w * sx - 1, y1 + h * sy - 1);
                b.x += g.x_advance as i32 * sx;
            }
            Font::Builtin | Font::Fixed(_) => {
                let (cell_w, cell_h) = (FixedFont::CELL_WIDTH * sx, FixedFont::CELL_HEIGHT * sy);
                if c == b'\n' {
                    b.x = 0;
                    b.y += cell_h;
                    return;
                }
                if t.wrap && b.x + cell_w > self.width() {
                    b.x = 0;
                    b.y += cell_h;
                }
                b.include(b.x, b.y, b.x + cell_w - 1, b.y + cell_h - 1);
                b.x += cell_w;
            }
        }
    }

    /// Draw `text` anchored at `(x, y)` by the current datum
    ///
    /// Anchored strings are kept on screen. Returns the pixel width.
    pub fn draw_string(&mut self, text: &str, x: i32, y: i32) -> i32 {
        let width = self.str_pixel_len(text);
        let height = self.line_height();
        let datum = self.text.datum;
        let (dx, dy) = datum.offset(width, height);
        let (mut x, mut y) = (x + dx, y + dy);
        if datum != Datum::TopLeft {
            x = x.max(0);
            if x + width > self.width() {
                x = self.width() - width;
            }
            y = y.max(0);
        }
        self.set_cursor(x, y);
        self.write_bytes(text.as_bytes());
        width
    }
}

/// Running state of a bounds computation
struct Bounds {
    x: i32,
    y: i32,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl Bounds {
    fn include(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.min_x = self.min_x.min(x1);
        self.min_y = self.min_y.min(y1);
        self.max_x = self.max_x.max(x2);
        self.max_y = self.max_y.max(y2);
    }
}
