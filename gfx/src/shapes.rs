//! Shape primitives
//!
//! Outlines, rounded rectangles, circles, triangles, lines, mono bitmaps
//! and gradients. All of them decompose into pixels, fast lines and
//! rectangle fills, so clipping and backend selection come for free.

use alloc::vec::Vec;

use crate::canvas::Canvas;
use crate::clip::Window;
use crate::color::Rgb14;
use crate::sink::DisplaySink;

bitflags::bitflags! {
    /// Quarter-circle selection for outline arcs
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Corners: u8 {
        const TOP_LEFT = 1 << 0;
        const TOP_RIGHT = 1 << 1;
        const BOTTOM_RIGHT = 1 << 2;
        const BOTTOM_LEFT = 1 << 3;
    }
}

bitflags::bitflags! {
    /// Half-circle selection for filled arcs
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Halves: u8 {
        const RIGHT = 1 << 0;
        const LEFT = 1 << 1;
    }
}

/// Midpoint circle walk; calls `plot(x, y)` for each step of the first octant
fn circle_steps(r: i32, mut plot: impl FnMut(i32, i32)) {
    let mut f = 1 - r;
    let mut dd_f_x = 1;
    let mut dd_f_y = -2 * r;
    let mut x = 0;
    let mut y = r;

    while x < y {
        if f >= 0 {
            y -= 1;
            dd_f_y += 2;
            f += dd_f_y;
        }
        x += 1;
        dd_f_x += 2;
        f += dd_f_x;
        plot(x, y);
    }
}

impl<S: DisplaySink> Canvas<S> {
    pub fn draw_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u16) {
        self.draw_fast_hline(x, y, w, color);
        self.draw_fast_hline(x, y + h - 1, w, color);
        self.draw_fast_vline(x, y, h, color);
        self.draw_fast_vline(x + w - 1, y, h, color);
    }

    pub fn draw_round_rect(&mut self, x: i32, y: i32, w: i32, h: i32, r: i32, color: u16) {
        self.draw_fast_hline(x + r, y, w - 2 * r, color);
        self.draw_fast_hline(x + r, y + h - 1, w - 2 * r, color);
        self.draw_fast_vline(x, y + r, h - 2 * r, color);
        self.draw_fast_vline(x + w - 1, y + r, h - 2 * r, color);

        self.draw_circle_helper(x + r, y + r, r, Corners::TOP_LEFT, color);
        self.draw_circle_helper(x + w - r - 1, y + r, r, Corners::TOP_RIGHT, color);
        self.draw_circle_helper(x + w - r - 1, y + h - r - 1, r, Corners::BOTTOM_RIGHT, color);
        self.draw_circle_helper(x + r, y + h - r - 1, r, Corners::BOTTOM_LEFT, color);
    }

    pub fn fill_round_rect(&mut self, x: i32, y: i32, w: i32, h: i32, r: i32, color: u16) {
        self.fill_rect(x + r, y, w - 2 * r, h, color);
        self.fill_circle_helper(x + w - r - 1, y + r, r, Halves::RIGHT, h - 2 * r - 1, color);
        self.fill_circle_helper(x + r, y + r, r, Halves::LEFT, h - 2 * r - 1, color);
    }

    pub fn draw_circle(&mut self, x0: i32, y0: i32, r: i32, color: u16) {
        self.draw_pixel(x0, y0 + r, color);
        self.draw_pixel(x0, y0 - r, color);
        self.draw_pixel(x0 + r, y0, color);
        self.draw_pixel(x0 - r, y0, color);

        circle_steps(r, |x, y| {
            self.draw_pixel(x0 + x, y0 + y, color);
            self.draw_pixel(x0 - x, y0 + y, color);
            self.draw_pixel(x0 + x, y0 - y, color);
            self.draw_pixel(x0 - x, y0 - y, color);
            self.draw_pixel(x0 + y, y0 + x, color);
            self.draw_pixel(x0 - y, y0 + x, color);
            self.draw_pixel(x0 + y, y0 - x, color);
            self.draw_pixel(x0 - y, y0 - x, color);
        });
    }

    /// Outline of the selected quarter circles
    pub fn draw_circle_helper(&mut self, x0: i32, y0: i32, r: i32, corners: Corners, color: u16) {
        circle_steps(r, |x, y| {
            if corners.contains(Corners::BOTTOM_RIGHT) {
                self.draw_pixel(x0 + x, y0 + y, color);
                self.draw_pixel(x0 + y, y0 + x, color);
            }
            if corners.contains(Corners::TOP_RIGHT) {
                self.draw_pixel(x0 + x, y0 - y, color);
                self.draw_pixel(x0 + y, y0 - x, color);
            }
            if corners.contains(Corners::BOTTOM_LEFT) {
                self.draw_pixel(x0 - y, y0 + x, color);
                self.draw_pixel(x0 - x, y0 + y, color);
            }
            if corners.contains(Corners::TOP_LEFT) {
                self.draw_pixel(x0 - y, y0 - x, color);
                self.draw_pixel(x0 - x, y0 - y, color);
            }
        });
    }

    /// Filled half circles, stretched vertically by `delta` rows
    pub fn fill_circle_helper(&mut self, x0: i32, y0: i32, r: i32, halves: Halves, delta: i32, color: u16) {
        circle_steps(r, |x, y| {
            if halves.contains(Halves::RIGHT) {
                self.draw_fast_vline(x0 + x, y0 - y, 2 * y + 1 + delta, color);
                self.draw_fast_vline(x0 + y, y0 - x, 2 * x + 1 + delta, color);
            }
            if halves.contains(Halves::LEFT) {
                self.draw_fast_vline(x0 - x, y0 - y, 2 * y + 1 + delta, color);
                self.draw_fast_vline(x0 - y, y0 - x, 2 * x + 1 + delta, color);
            }
        });
    }

    pub fn fill_circle(&mut self, x0: i32, y0: i32, r: i32, color: u16) {
        self.draw_fast_vline(x0, y0 - r, 2 * r + 1, color);
        self.fill_circle_helper(x0, y0, r, Halves::all(), 0, color);
    }

    pub fn draw_triangle(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, x2: i32, y2: i32, color: u16) {
        self.draw_line(x0, y0, x1, y1, color);
        self.draw_line(x1, y1, x2, y2, color);
        self.draw_line(x2, y2, x0, y0, color);
    }

    /// Scanline fill; vertices sorted by y, upper and lower halves walked separately
    pub fn fill_triangle(
        &mut self,
        mut x0: i32,
        mut y0: i32,
        mut x1: i32,
        mut y1: i32,
        mut x2: i32,
        mut y2: i32,
        color: u16,
    ) {
        if y0 > y1 {
            core::mem::swap(&mut y0, &mut y1);
            core::mem::swap(&mut x0, &mut x1);
        }
        if y1 > y2 {
            core::mem::swap(&mut y2, &mut y1);
            core::mem::swap(&mut x2, &mut x1);
        }
        if y0 > y1 {
            core::mem::swap(&mut y0, &mut y1);
            core::mem::swap(&mut x0, &mut x1);
        }

        if y0 == y2 {
            let a = x0.min(x1).min(x2);
            let b = x0.max(x1).max(x2);
            self.draw_fast_hline(a, y0, b - a + 1, color);
            return;
        }

        let (dx01, dy01) = (x1 - x0, y1 - y0);
        let (dx02, dy02) = (x2 - x0, y2 - y0);
        let (dx12, dy12) = (x2 - x1, y2 - y1);
        let mut sa = 0;
        let mut sb = 0;

        // Flat bottom: include the y1 scanline here, the lower loop is empty
        let last = if y1 == y2 { y1 } else { y1 - 1 };

        let mut y = y0;
        while y <= last {
            let mut a = x0 + sa / dy01;
            let mut b = x0 + sb / dy02;
            sa += dx01;
            sb += dx02;
            if a > b {
                core::mem::swap(&mut a, &mut b);
            }
            self.draw_fast_hline(a, y, b - a + 1, color);
            y += 1;
        }

        sa = dx12 * (y - y1);
        sb = dx02 * (y - y0);
        while y <= y2 {
            let mut a = x1 + sa / dy12;
            let mut b = x0 + sb / dy02;
            sa += dx12;
            sb += dx02;
            if a > b {
                core::mem::swap(&mut a, &mut b);
            }
            self.draw_fast_hline(a, y, b - a + 1, color);
            y += 1;
        }
    }

    /// Bresenham line with fast paths for horizontal and vertical lines
    pub fn draw_line(&mut self, mut x0: i32, mut y0: i32, mut x1: i32, mut y1: i32, color: u16) {
        if y0 == y1 {
            let (a, b) = (x0.min(x1), x0.max(x1));
            self.draw_fast_hline(a, y0, b - a + 1, color);
            return;
        }
        if x0 == x1 {
            let (a, b) = (y0.min(y1), y0.max(y1));
            self.draw_fast_vline(x0, a, b - a + 1, color);
            return;
        }

        let steep = (y1 - y0).abs() > (x1 - x0).abs();
        if steep {
            core::mem::swap(&mut x0, &mut y0);
            core::mem::swap(&mut x1, &mut y1);
        }
        if x0 > x1 {
            core::mem::swap(&mut x0, &mut x1);
            core::mem::swap(&mut y0, &mut y1);
        }

        let dx = x1 - x0;
        let dy = (y1 - y0).abs();
        let mut err = dx / 2;
        let ystep = if y0 < y1 { 1 } else { -1 };

        while x0 <= x1 {
            if steep {
                self.draw_pixel(y0, x0, color);
            } else {
                self.draw_pixel(x0, y0, color);
            }
            err -= dy;
            if err < 0 {
                y0 += ystep;
                err += dx;
            }
            x0 += 1;
        }
    }

    /// 1bpp bitmap, rows padded to whole bytes, MSB first; clear bits are transparent
    pub fn draw_bitmap(&mut self, x: i32, y: i32, bitmap: &[u8], w: i32, h: i32, color: u16) {
        if w <= 0 || h <= 0 {
            return;
        }
        let byte_width = ((w + 7) / 8) as usize;
        for j in 0..h {
            let row = j as usize * byte_width;
            let mut i = 0;
            while i < w {
                let bit = |i: i32| {
                    bitmap
                        .get(row + (i / 8) as usize)
                        .is_some_and(|&b| b & (0x80 >> (i & 7)) != 0)
                };
                if !bit(i) {
                    i += 1;
                    continue;
                }
                let start = i;
                while i < w && bit(i) {
                    i += 1;
                }
                self.draw_fast_hline(x + start, y + j, i - start, color);
            }
        }
    }

    /// Top row `color1`, bottom row `color2`, interpolated in RGB14
    pub fn fill_rect_vgradient(&mut self, x: i32, y: i32, w: i32, h: i32, color1: u16, color2: u16) {
        let Some(win) = self.clip.clip_rect(x, y, w, h) else {
            return;
        };
        let (from, to) = (Rgb14::from_565(color1), Rgb14::from_565(color2));
        for r in 0..win.h {
            let color = from.lerp(to, win.skip_rows + r, h - 1).to_565();
            let row = Window { y: win.y + r, h: 1, ..win };
            self.fill_window(&row, color);
        }
    }

    /// Left column `color1`, right column `color2`, interpolated in RGB14
    pub fn fill_rect_hgradient(&mut self, x: i32, y: i32, w: i32, h: i32, color1: u16, color2: u16) {
        let Some(win) = self.clip.clip_rect(x, y, w, h) else {
            return;
        };
        let (from, to) = (Rgb14::from_565(color1), Rgb14::from_565(color2));
        let columns: Vec<u16> = (0..win.w)
            .map(|c| from.lerp(to, win.skip_left + c, w - 1).to_565())
            .collect();
        self.paint_window(&win, |dx, _| columns[(dx - win.x) as usize]);
    }

    pub fn fill_screen_vgradient(&mut self, color1: u16, color2: u16) {
        self.fill_rect_vgradient(0, 0, self.width(), self.height(), color1, color2);
    }

    pub fn fill_screen_hgradient(&mut self, color1: u16, color2: u16) {
        self.fill_rect_hgradient(0, 0, self.width(), self.height(), color1, color2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{color565_to_rgb, BLACK, RED, WHITE};
    use crate::config::CanvasConfig;
    use crate::sink::MemoryPanel;

    fn canvas(width: i32, height: i32) -> Canvas<MemoryPanel> {
        Canvas::new(
            MemoryPanel::new(width as usize, height as usize),
            CanvasConfig::new(width, height),
        )
    }

    fn lit(canvas: &Canvas<MemoryPanel>) -> usize {
        canvas.sink().pixels().iter().filter(|&&p| p != 0).count()
    }

    #[test]
    fn test_draw_rect_outline() {
        let mut c = canvas(10, 10);
        c.draw_rect(1, 1, 5, 4, RED);
        assert_eq!(c.sink().pixel(1, 1), RED);
        assert_eq!(c.sink().pixel(5, 4), RED);
        assert_eq!(c.sink().pixel(3, 2), 0);
        assert_eq!(lit(&c), 14);
    }

    #[test]
    fn test_fill_circle_is_symmetric() {
        let mut c = canvas(21, 21);
        c.fill_circle(10, 10, 6, WHITE);
        for y in 0..21usize {
            for x in 0..21usize {
                assert_eq!(c.sink().pixel(x, y), c.sink().pixel(20 - x, y));
                assert_eq!(c.sink().pixel(x, y), c.sink().pixel(x, 20 - y));
            }
        }
        assert_eq!(c.sink().pixel(10, 4), WHITE);
        assert_eq!(c.sink().pixel(10, 3), 0);
        assert_eq!(c.sink().pixel(4, 10), WHITE);
    }

    #[test]
    fn test_draw_circle_outline() {
        let mut c = canvas(21, 21);
        c.draw_circle(10, 10, 5, WHITE);
        assert_eq!(c.sink().pixel(10, 5), WHITE);
        assert_eq!(c.sink().pixel(15, 10), WHITE);
        assert_eq!(c.sink().pixel(10, 10), 0);
    }

    #[test]
    fn test_round_rect_corners() {
        let mut c = canvas(20, 20);
        c.fill_round_rect(0, 0, 20, 20, 5, RED);
        assert_eq!(c.sink().pixel(0, 0), 0);
        assert_eq!(c.sink().pixel(19, 19), 0);
        assert_eq!(c.sink().pixel(10, 10), RED);
        assert_eq!(c.sink().pixel(0, 10), RED);

        let mut o = canvas(20, 20);
        o.draw_round_rect(0, 0, 20, 20, 5, RED);
        assert_eq!(o.sink().pixel(0, 0), 0);
        assert_eq!(o.sink().pixel(10, 0), RED);
        assert_eq!(o.sink().pixel(10, 10), 0);
    }

    #[test]
    fn test_draw_line_diagonal_and_steep() {
        let mut c = canvas(10, 10);
        c.draw_line(0, 0, 9, 9, RED);
        for i in 0..10usize {
            assert_eq!(c.sink().pixel(i, i), RED);
        }
        assert_eq!(lit(&c), 10);

        let mut s = canvas(10, 10);
        s.draw_line(2, 9, 3, 0, RED);
        assert_eq!(lit(&s), 10);
        assert_eq!(s.sink().pixel(2, 9), RED);
        assert_eq!(s.sink().pixel(3, 0), RED);
    }

    #[test]
    fn test_fill_triangle_covers_vertices() {
        let mut c = canvas(20, 20);
        c.fill_triangle(1, 1, 18, 4, 6, 17, RED);
        assert_eq!(c.sink().pixel(1, 1), RED);
        assert_eq!(c.sink().pixel(18, 4), RED);
        assert_eq!(c.sink().pixel(6, 17), RED);
        assert_eq!(c.sink().pixel(8, 8), RED);
        assert_eq!(c.sink().pixel(18, 18), 0);

        let mut flat = canvas(10, 10);
        flat.fill_triangle(7, 3, 2, 3, 4, 3, RED);
        assert_eq!(lit(&flat), 6);
    }

    #[test]
    fn test_draw_bitmap_msb_first() {
        let mut c = canvas(16, 2);
        // 10-pixel rows, two bytes each
        c.draw_bitmap(0, 0, &[0b1010_0000, 0b0100_0000, 0xFF, 0xC0], 10, 2, RED);
        assert_eq!(c.sink().pixel(0, 0), RED);
        assert_eq!(c.sink().pixel(1, 0), 0);
        assert_eq!(c.sink().pixel(2, 0), RED);
        assert_eq!(c.sink().pixel(9, 0), RED);
        assert_eq!(c.sink().pixel(8, 0), 0);
        assert_eq!(c.sink().pixel(9, 1), RED);
        assert_eq!(c.sink().pixel(10, 1), 0);
    }

    #[test]
    fn test_vertical_gradient_ramp() {
        let mut c = canvas(4, 16);
        c.fill_rect_vgradient(0, 0, 4, 16, BLACK, WHITE);
        assert_eq!(c.sink().pixel(0, 0), BLACK);
        let luma = |p: u16| {
            let (r, g, b) = color565_to_rgb(p);
            r as u32 * 3 + g as u32 * 6 + b as u32
        };
        for y in 1..16usize {
            assert!(luma(c.sink().pixel(2, y)) > luma(c.sink().pixel(2, y - 1)));
            assert_eq!(c.sink().pixel(0, y), c.sink().pixel(3, y));
        }
        let (r, g, b) = color565_to_rgb(c.sink().pixel(0, 15));
        assert!(r >= 0xF0 && g >= 0xF8 && b >= 0xF0);
    }

    #[test]
    fn test_gradient_with_huge_hidden_extent() {
        let mut c = canvas(4, 10);
        c.fill_rect_vgradient(0, -300_000, 4, 300_010, BLACK, WHITE);
        assert_eq!(c.sink().pixel(0, 9), WHITE);
        assert_ne!(c.sink().pixel(0, 0), BLACK);

        let mut h = canvas(10, 2);
        h.fill_rect_hgradient(-300_000, 0, 300_010, 2, BLACK, WHITE);
        assert_eq!(h.sink().pixel(9, 1), WHITE);
        assert_ne!(h.sink().pixel(0, 1), BLACK);
    }

    #[test]
    fn test_horizontal_gradient_clipped_keeps_ramp() {
        let mut full = canvas(16, 2);
        full.fill_rect_hgradient(0, 0, 16, 2, BLACK, WHITE);
        let mut clipped = canvas(16, 2);
        clipped.set_clip_rect(8, 0, 8, 2);
        clipped.fill_rect_hgradient(0, 0, 16, 2, BLACK, WHITE);
        for x in 8..16usize {
            assert_eq!(full.sink().pixel(x, 1), clipped.sink().pixel(x, 1));
        }
        assert_eq!(clipped.sink().pixel(7, 1), 0);
        assert_eq!(full.sink().pixel(15, 0), WHITE);
    }
}
