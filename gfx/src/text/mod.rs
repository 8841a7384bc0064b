//! Text rendering
//!
//! Cursor and wrap handling and glyph drawing for the three font kinds.
//! Scroll areas live in `scroll`, string measurement and anchored
//! drawing in `measure`.
//!
//! Transparent text (foreground == background) is drawn as merged
//! horizontal runs. Opaque text paints one window per glyph covering both
//! the ink and the advance cell. Proportional glyphs may ink past their
//! advance; the last opaque glyph is remembered so the next adjacent glyph
//! does not paint background over that ink.

use alloc::vec;
use alloc::vec::Vec;

use crate::canvas::Canvas;
use crate::clip::Window;
use crate::color::{blend_prexpanded, prexpand, BLACK, WHITE};
use crate::config::CENTER;
use crate::font::{FixedFont, Font, GfxFont, PackedFont, GLCD};
use crate::sink::DisplaySink;

mod measure;
mod scroll;

pub use measure::Datum;
pub use scroll::ScrollArea;

/// Glyph coverage placed in display coordinates
struct Ink {
    x: i32,
    y: i32,
    cols: i32,
    rows: i32,
    scale_x: i32,
    scale_y: i32,
    levels: Vec<u8>,
    /// 0 for solid glyphs, else multiplier onto the 0..=31 blend scale
    alpha_scale: u8,
}

impl Ink {
    fn level(&self, px: i32, py: i32) -> u8 {
        let (dx, dy) = (px - self.x, py - self.y);
        if dx < 0 || dy < 0 {
            return 0;
        }
        let (gx, gy) = (dx / self.scale_x, dy / self.scale_y);
        if gx >= self.cols || gy >= self.rows {
            return 0;
        }
        self.levels.get((gy * self.cols + gx) as usize).copied().unwrap_or(0)
    }
}

/// What the previous opaque glyph left on screen
#[derive(Debug, Clone)]
struct LastGlyph {
    area: Window,
    /// Color of each inked pixel of `area`
    ink: Vec<Option<u16>>,
    bg: u16,
    /// Display cursor row it was drawn on
    cursor_y: i32,
    /// Display cursor column after its advance
    next_x: i32,
}

impl LastGlyph {
    fn ink_at(&self, px: i32, py: i32) -> Option<u16> {
        let a = &self.area;
        if px < a.x || py < a.y || px >= a.right() || py >= a.bottom() {
            return None;
        }
        self.ink
            .get(((py - a.y) * a.w + (px - a.x)) as usize)
            .copied()
            .flatten()
    }
}

pub(crate) struct TextState {
    cursor_x: i32,
    cursor_y: i32,
    size_x: i32,
    size_y: i32,
    fg: u16,
    bg: u16,
    fg_pre: u32,
    bg_pre: u32,
    wrap: bool,
    font: Font,
    datum: Datum,
    scroll: ScrollArea,
    scroll_bg: u16,
    scroll_enabled: bool,
    in_scroll_area: bool,
    center_x: bool,
    center_y: bool,
    gfx_min_y_offset: i32,
    last: Option<LastGlyph>,
}

impl TextState {
    pub fn new(wrap: bool) -> Self {
        Self {
            cursor_x: 0,
            cursor_y: 0,
            size_x: 1,
            size_y: 1,
            fg: WHITE,
            bg: WHITE,
            fg_pre: prexpand(WHITE),
            bg_pre: prexpand(WHITE),
            wrap,
            font: Font::Builtin,
            datum: Datum::TopLeft,
            scroll: ScrollArea::default(),
            scroll_bg: BLACK,
            scroll_enabled: false,
            in_scroll_area: false,
            center_x: false,
            center_y: false,
            gfx_min_y_offset: 0,
            last: None,
        }
    }

    /// Cursor back to the top-left corner
    pub fn home(&mut self) {
        self.cursor_x = 0;
        self.cursor_y = 0;
        self.last = None;
    }

    fn scrolling(&self) -> bool {
        self.scroll_enabled && self.in_scroll_area
    }

    fn opaque(&self) -> bool {
        self.fg != self.bg
    }

    /// Column to return to on a new line
    fn line_start(&self) -> i32 {
        if self.scrolling() {
            self.scroll.x
        } else {
            0
        }
    }
}

impl<S: DisplaySink> Canvas<S> {
    // =========================================================================
    // Text state
    // =========================================================================

    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.place_cursor(x, y, false);
    }

    /// Like [`set_cursor`](Self::set_cursor), and the next write is
    /// centered on this point
    pub fn set_cursor_centered(&mut self, x: i32, y: i32) {
        self.place_cursor(x, y, true);
    }

    fn place_cursor(&mut self, x: i32, y: i32, center: bool) {
        let (width, height) = (self.width(), self.height());
        let t = &mut self.text;
        t.center_x = center;
        t.center_y = center;
        let x = if x == CENTER {
            t.center_x = true;
            width / 2
        } else {
            x
        };
        let y = if y == CENTER {
            t.center_y = true;
            height / 2
        } else {
            y
        };
        t.cursor_x = x.min(width - 1).max(0);
        t.cursor_y = y.min(height - 1).max(0);
        t.in_scroll_area = t.scroll.holds(t.cursor_x, t.cursor_y);
        t.last = None;
    }

    pub fn cursor(&self) -> (i32, i32) {
        (self.text.cursor_x, self.text.cursor_y)
    }

    /// Scale factors; zero is treated as one
    pub fn set_text_size(&mut self, size_x: u8, size_y: u8) {
        self.text.size_x = size_x.max(1) as i32;
        self.text.size_y = size_y.max(1) as i32;
        self.text.last = None;
    }

    pub fn text_size(&self) -> (u8, u8) {
        (self.text.size_x as u8, self.text.size_y as u8)
    }

    /// Transparent text in `color`
    pub fn set_text_color(&mut self, color: u16) {
        self.set_text_color_bg(color, color);
    }

    /// Opaque text unless both colors are equal
    pub fn set_text_color_bg(&mut self, fg: u16, bg: u16) {
        let t = &mut self.text;
        t.fg = fg;
        t.bg = bg;
        t.fg_pre = prexpand(fg);
        t.bg_pre = prexpand(bg);
    }

    /// `(foreground, background)`
    pub fn text_color(&self) -> (u16, u16) {
        (self.text.fg, self.text.bg)
    }

    pub fn set_text_wrap(&mut self, wrap: bool) {
        self.text.wrap = wrap;
    }

    pub fn text_wrap(&self) -> bool {
        self.text.wrap
    }

    pub fn set_text_datum(&mut self, datum: Datum) {
        self.text.datum = datum;
    }

    pub fn text_datum(&self) -> Datum {
        self.text.datum
    }

    pub fn font(&self) -> Font {
        self.text.font
    }

    /// Select a font
    ///
    /// GFX fonts position glyphs from the baseline, so switching to or from
    /// one moves the cursor by 6 rows. Selecting an anti-aliased font while
    /// text is transparent makes the background black or white, whichever
    /// differs from the foreground.
    pub fn set_font(&mut self, font: Font) {
        let t = &mut self.text;
        t.last = None;
        if font.same_as(&t.font) {
            return;
        }
        match (t.font.is_gfx(), font) {
            (false, Font::Gfx(_)) => t.cursor_y += 6,
            (true, Font::Gfx(_)) => {}
            (true, _) => t.cursor_y -= 6,
            _ => {}
        }
        if let Font::Gfx(gfx) = font {
            t.gfx_min_y_offset = gfx.min_y_offset();
        }
        if font.is_anti_aliased() && !t.opaque() {
            t.bg = if t.fg == BLACK { WHITE } else { BLACK };
            t.bg_pre = prexpand(t.bg);
        }
        t.font = font;
        log::debug!("font {}", font.kind());
    }

    // =========================================================================
    // Writing
    // =========================================================================

    /// Write a string at the cursor
    pub fn print(&mut self, text: &str) {
        self.write_bytes(text.as_bytes());
    }

    /// Write bytes at the cursor, honoring a pending auto-center request
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if self.text.center_x || self.text.center_y {
            let (bx, by, w, h) = self.bounds_of(bytes, 0, 0);
            if self.text.center_x && w > 0 {
                self.text.cursor_x -= bx + w / 2;
            }
            if self.text.center_y && h > 0 {
                self.text.cursor_y -= by + h / 2;
            }
            self.text.center_x = false;
            self.text.center_y = false;
        }
        for &c in bytes {
            self.write_byte(c);
        }
    }

    pub fn write_byte(&mut self, c: u8) {
        if c == b'\r' {
            return;
        }
        match self.text.font {
            Font::Packed(font) => {
                if c == b'\n' {
                    self.new_line(font.line_space as i32);
                } else {
                    self.draw_packed_char(font, c as u32);
                }
            }
            Font::Gfx(font) => {
                if c == b'\n' {
                    self.new_line(self.text.size_y * font.y_advance as i32);
                } else {
                    self.draw_gfx_char(font, c as u32);
                }
            }
            Font::Builtin | Font::Fixed(_) => self.write_fixed(c),
        }
    }

    fn new_line(&mut self, height: i32) {
        self.text.cursor_y += height;
        self.text.cursor_x = self.text.line_start();
    }

    fn write_fixed(&mut self, c: u8) {
        let (sx, sy) = (self.text.size_x, self.text.size_y);
        let (cell_w, cell_h) = (FixedFont::CELL_WIDTH * sx, FixedFont::CELL_HEIGHT * sy);
        if c == b'\n' {
            self.new_line(cell_h);
            return;
        }
        let scroll = self.text.scroll;
        if self.text.scrolling() && self.text.cursor_y > scroll.y + scroll.h - cell_h {
            self.scroll_text_area(cell_h);
            self.text.cursor_y -= cell_h;
            self.text.cursor_x = scroll.x;
        }

        let t = &self.text;
        let (x, y, fg, bg) = (t.cursor_x, t.cursor_y, t.fg, t.bg);
        self.draw_char(x, y, c, fg, bg, sx as u8, sy as u8);

        let width = self.width();
        let t = &mut self.text;
        t.cursor_x += cell_w;
        if t.wrap && t.scrolling() && t.cursor_x > scroll.x + scroll.w - cell_w {
            t.cursor_y += cell_h;
            t.cursor_x = scroll.x;
        } else if t.wrap && t.cursor_x > width - cell_w {
            t.cursor_y += cell_h;
            t.cursor_x = 0;
        }
    }

    /// Draw one fixed-cell character at `(x, y)` without touching the cursor
    ///
    /// Uses the selected fixed table, or the built-in one while another kind
    /// of font is active. Codes outside the table draw an empty cell.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_char(&mut self, x: i32, y: i32, c: u8, fg: u16, bg: u16, size_x: u8, size_y: u8) {
        let table = self.text.font.fixed_table().unwrap_or(&GLCD);
        let columns = table.columns(c as u32).unwrap_or(&[]);
        let (sx, sy) = (size_x.max(1) as i32, size_y.max(1) as i32);
        let ink = |col: i32, row: i32| {
            columns
                .get(col as usize)
                .is_some_and(|&bits| (bits >> row) & 1 != 0)
        };

        if fg == bg {
            for row in 0..FixedFont::CELL_HEIGHT {
                let mut col = 0;
                while col < FixedFont::COLUMNS as i32 {
                    if !ink(col, row) {
                        col += 1;
                        continue;
                    }
                    let start = col;
                    while col < FixedFont::COLUMNS as i32 && ink(col, row) {
                        col += 1;
                    }
                    self.fill_rect(x + start * sx, y + row * sy, (col - start) * sx, sy, fg);
                }
            }
            return;
        }

        let cell = (FixedFont::CELL_WIDTH * sx, FixedFont::CELL_HEIGHT * sy);
        let Some(win) = self.clip.clip_rect(x, y, cell.0, cell.1) else {
            return;
        };
        let (left, top) = (win.x - win.skip_left, win.y - win.skip_rows);
        self.paint_window(&win, |dx, dy| {
            if ink((dx - left) / sx, (dy - top) / sy) {
                fg
            } else {
                bg
            }
        });
    }

    // =========================================================================
    // Packed fonts
    // =========================================================================

    fn draw_packed_char(&mut self, font: &'static PackedFont, c: u32) {
        let Some(glyph) = font.glyph(c) else {
            return;
        };
        let (width, height) = (glyph.width as i32, glyph.height as i32);
        let line_space = font.line_space as i32;
        let cap_height = font.cap_height as i32;
        let canvas_width = self.width();
        let scroll = self.text.scroll;

        let t = &mut self.text;
        t.cursor_x = t.cursor_x.max(0);
        if t.cursor_x + glyph.xoffset < 0 {
            t.cursor_x -= glyph.xoffset;
        }
        if t.cursor_x + glyph.xoffset + width > canvas_width {
            if !t.wrap {
                return;
            }
            t.cursor_x = (-glyph.xoffset).max(0);
            t.cursor_y += line_space;
        }
        if t.wrap && t.scrolling() && t.cursor_x + glyph.xoffset + width > scroll.x + scroll.w {
            t.cursor_x = scroll.x + (-glyph.xoffset).max(0);
            t.cursor_y += line_space;
        }
        if t.scrolling() && t.cursor_y > scroll.y + scroll.h - cap_height {
            self.scroll_text_area(line_space);
            self.text.cursor_y -= line_space;
            self.text.cursor_x = scroll.x;
        }
        if self.text.cursor_y >= self.height() {
            return;
        }

        let (cursor_x, cursor_y) = (self.text.cursor_x, self.text.cursor_y);
        let origin_x = cursor_x + glyph.xoffset;
        let origin_y = cursor_y + cap_height - height - glyph.yoffset;
        let levels = glyph.coverage();
        let delta = glyph.delta as i32;

        if !self.text.opaque() {
            self.text.last = None;
            let threshold = if font.is_anti_aliased() {
                1u8 << (font.bits_per_pixel() - 1)
            } else {
                1
            };
            let fg = self.text.fg;
            self.fill_ink_runs(origin_x, origin_y, width, &levels, 1, 1, threshold, fg);
            self.text.cursor_x += delta;
            return;
        }

        let (ox, oy) = self.origin();
        let (cx, cy) = (cursor_x + ox, cursor_y + oy);
        let (gx, gy) = (origin_x + ox, origin_y + oy);
        let start_x = gx.min(cx).max(0);
        let start_y = gy.min(cy).max(0);
        let end_x = (cx + delta).max(gx + width);
        let end_y = (cy + line_space).max(gy + height);
        let ink = Ink {
            x: gx,
            y: gy,
            cols: width,
            rows: height,
            scale_x: 1,
            scale_y: 1,
            levels,
            alpha_scale: if font.is_anti_aliased() { font.alpha_scale() } else { 0 },
        };
        self.paint_opaque_glyph(start_x, start_y, end_x, end_y, &ink, cx, cy, delta);
    }

    // =========================================================================
    // GFX fonts
    // =========================================================================

    fn draw_gfx_char(&mut self, font: &'static GfxFont, c: u32) {
        let Some(glyph) = font.glyph(c) else {
            return;
        };
        let (w, h) = (glyph.width as i32, glyph.height as i32);
        if (w == 0 || h == 0) && c != b' ' as u32 {
            return;
        }
        let (sx, sy) = (self.text.size_x, self.text.size_y);
        let y_advance = font.y_advance as i32;
        let xo = glyph.x_offset as i32;
        let yo = glyph.y_offset as i32 + y_advance / 2;

        let canvas_width = self.width();
        let t = &mut self.text;
        if t.wrap && t.cursor_x + sx * (xo + w) > canvas_width {
            t.cursor_x = 0;
            t.cursor_y += sy * y_advance;
        }
        let (cursor_x, cursor_y) = (t.cursor_x, t.cursor_y);
        let advance = glyph.x_advance as i32 * sx;
        let levels: Vec<u8> = (0..h)
            .flat_map(|gy| (0..w).map(move |gx| (gx, gy)))
            .map(|(gx, gy)| font.pixel(glyph, gx, gy) as u8)
            .collect();

        if !self.text.opaque() {
            self.text.last = None;
            let fg = self.text.fg;
            self.fill_ink_runs(cursor_x + xo * sx, cursor_y + yo * sy, w, &levels, sx, sy, 1, fg);
            self.text.cursor_x += advance;
            return;
        }

        let (ox, oy) = self.origin();
        let (cx, cy) = (cursor_x + ox, cursor_y + oy);
        let start_x = cx + xo.min(0) * sx;
        let end_x = cx + (glyph.x_advance as i32).max(xo + w) * sx;
        let start_y = cy + self.text.gfx_min_y_offset * sy + y_advance * sy / 2;
        let end_y = start_y + y_advance * sy;
        let ink = Ink {
            x: cx + xo * sx,
            y: cy + yo * sy,
            cols: w,
            rows: h,
            scale_x: sx,
            scale_y: sy,
            levels,
            alpha_scale: 0,
        };
        self.paint_opaque_glyph(start_x, start_y, end_x, end_y, &ink, cx, cy, advance);
    }

    // =========================================================================
    // Glyph painting
    // =========================================================================

    /// Transparent glyph: one fill per run of covered pixels, identical
    /// consecutive rows merged into one taller fill
    #[allow(clippy::too_many_arguments)]
    fn fill_ink_runs(
        &mut self,
        x: i32,
        y: i32,
        cols: i32,
        levels: &[u8],
        sx: i32,
        sy: i32,
        threshold: u8,
        color: u16,
    ) {
        if cols <= 0 {
            return;
        }
        let rows: Vec<&[u8]> = levels.chunks(cols as usize).collect();
        let mut row = 0;
        while row < rows.len() {
            let on = |gx: usize| rows[row][gx] >= threshold;
            let mut repeat = 1;
            while row + repeat < rows.len()
                && (0..cols as usize).all(|gx| (rows[row + repeat][gx] >= threshold) == on(gx))
            {
                repeat += 1;
            }
            let mut gx = 0;
            while gx < cols as usize {
                if !on(gx) {
                    gx += 1;
                    continue;
                }
                let start = gx;
                while gx < cols as usize && on(gx) {
                    gx += 1;
                }
                self.fill_rect(
                    x + start as i32 * sx,
                    y + row as i32 * sy,
                    (gx - start) as i32 * sx,
                    repeat as i32 * sy,
                    color,
                );
            }
            row += repeat;
        }
    }

    /// Opaque glyph: paint the display box `[x0, x1) x [y0, y1)` in one
    /// window and advance the cursor
    ///
    /// `(cx, cy)` is the display cursor the glyph was drawn at; the previous
    /// glyph's ink is kept only when it ended exactly there.
    #[allow(clippy::too_many_arguments)]
    fn paint_opaque_glyph(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        ink: &Ink,
        cx: i32,
        cy: i32,
        advance: i32,
    ) {
        let prev = self
            .text
            .last
            .take()
            .filter(|p| p.cursor_y == cy && p.next_x == cx);
        self.text.cursor_x += advance;

        let Some(win) = self.clip.clip_display_rect(x0, y0, x1 - x0, y1 - y0) else {
            return;
        };
        let t = &self.text;
        let (fg, bg, fg_pre, bg_pre) = (t.fg, t.bg, t.fg_pre, t.bg_pre);
        let mut painted = vec![None; win.area()];

        self.paint_window(&win, |px, py| {
            let level = ink.level(px, py);
            // ink kept from the previous glyph stays ink for the next one
            let inked = match level {
                0 => prev.as_ref().and_then(|p| p.ink_at(px, py)),
                _ if ink.alpha_scale == 0 => Some(fg),
                _ => Some(blend_prexpanded(
                    fg_pre,
                    bg_pre,
                    level.saturating_mul(ink.alpha_scale).min(31),
                )),
            };
            if let Some(color) = inked {
                if let Some(slot) = painted.get_mut(((py - win.y) * win.w + (px - win.x)) as usize) {
                    *slot = Some(color);
                }
                return color;
            }
            match prev.as_ref() {
                Some(p) if px < cx => p.bg,
                _ => bg,
            }
        });

        self.text.last = Some(LastGlyph {
            area: win,
            ink: painted,
            bg,
            cursor_y: cy,
            next_x: cx + advance,
        });
    }
}

impl<S: DisplaySink> core::fmt::Write for Canvas<S> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.write_bytes(s.as_bytes());
        Ok(())
    }
}
