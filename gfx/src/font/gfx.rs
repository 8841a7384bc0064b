//! Adafruit GFX fonts
//!
//! Glyph bitmaps are packed continuously, MSB first, with no padding
//! between rows. Offsets are relative to the cursor, which sits on the
//! baseline.

/// Per-glyph metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GfxGlyph {
    /// Byte offset of the first bitmap byte
    pub bitmap_offset: u16,
    pub width: u8,
    pub height: u8,
    pub x_advance: u8,
    pub x_offset: i8,
    /// Distance from the baseline to the top row, usually negative
    pub y_offset: i8,
}

#[derive(Debug, Clone, Copy)]
pub struct GfxFont {
    pub bitmap: &'static [u8],
    pub glyphs: &'static [GfxGlyph],
    pub first: u16,
    pub last: u16,
    /// Line height
    pub y_advance: u8,
}

impl GfxFont {
    pub fn glyph(&self, c: u32) -> Option<&GfxGlyph> {
        if c < self.first as u32 || c > self.last as u32 {
            return None;
        }
        self.glyphs.get((c - self.first as u32) as usize)
    }

    /// Smallest `y_offset` over all glyphs, never above zero
    pub fn min_y_offset(&self) -> i32 {
        self.glyphs
            .iter()
            .map(|g| g.y_offset as i32)
            .fold(0, i32::min)
    }

    /// Ink at glyph pixel `(gx, gy)`
    pub fn pixel(&self, glyph: &GfxGlyph, gx: i32, gy: i32) -> bool {
        if gx < 0 || gy < 0 || gx >= glyph.width as i32 || gy >= glyph.height as i32 {
            return false;
        }
        let bit = (gy * glyph.width as i32 + gx) as usize;
        self.bitmap
            .get(glyph.bitmap_offset as usize + bit / 8)
            .is_some_and(|&byte| byte & (0x80 >> (bit % 8)) != 0)
    }
}
