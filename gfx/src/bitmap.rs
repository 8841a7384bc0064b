//! Bitmap blits
//!
//! RGB565 rectangles, sub-images of larger images, read-back, and
//! paletted 1/2/4/8 bits-per-pixel images. Clipping keeps the source in
//! step with its stride, including when the left edge falls inside a byte
//! of a packed paletted row.

use crate::canvas::Canvas;
use crate::clip::{ClipRegion, Window};
use crate::config::CENTER;
use crate::sink::DisplaySink;

impl<S: DisplaySink> Canvas<S> {
    fn center(&self, x: i32, y: i32, w: i32, h: i32) -> (i32, i32) {
        let x = if x == CENTER { (self.width() - w) / 2 } else { x };
        let y = if y == CENTER { (self.height() - h) / 2 } else { y };
        (x, y)
    }

    /// Blit `w x h` RGB565 pixels; `CENTER` centers on that axis
    pub fn write_rect(&mut self, x: i32, y: i32, w: i32, h: i32, pixels: &[u16]) {
        let (x, y) = self.center(x, y, w, h);
        let Some(win) = self.clip.clip_rect(x, y, w, h) else {
            return;
        };
        let start = win.source_offset(w as usize);
        if let Some(src) = pixels.get(start..) {
            self.surface().write(&win, src, w as usize);
        }
    }

    /// Blit the `w x h` part at `(image_x, image_y)` of an
    /// `image_width x image_height` image
    #[allow(clippy::too_many_arguments)]
    pub fn write_sub_image_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        image_x: i32,
        image_y: i32,
        image_width: i32,
        image_height: i32,
        pixels: &[u16],
    ) {
        if image_x < 0 || image_y < 0 {
            return;
        }
        let w = w.min(image_width - image_x);
        let h = h.min(image_height - image_y);
        let (x, y) = self.center(x, y, w, h);
        let Some(win) = self.clip.clip_rect(x, y, w, h) else {
            return;
        };
        let start = image_y as usize * image_width as usize
            + image_x as usize
            + win.source_offset(image_width as usize);
        if let Some(src) = pixels.get(start..) {
            self.surface().write(&win, src, image_width as usize);
        }
    }

    /// Visible part of a logical rectangle on the whole screen, ignoring the user clip
    fn screen_window(&self, x: i32, y: i32, w: i32, h: i32) -> Option<Window> {
        let (ox, oy) = self.origin();
        ClipRegion::new(self.width(), self.height()).clip_display_rect(x + ox, y + oy, w, h)
    }

    /// Read `w x h` pixels into `out` (row-major, stride `w`)
    ///
    /// Comes from the frame buffer when it is enabled, otherwise from the
    /// panel. Off-screen positions are left untouched.
    pub fn read_rect(&mut self, x: i32, y: i32, w: i32, h: i32, out: &mut [u16]) {
        let Some(win) = self.screen_window(x, y, w, h) else {
            return;
        };
        let start = win.source_offset(w as usize);
        if let Some(dst) = out.get_mut(start..) {
            self.surface().read(&win, dst, w as usize);
        }
    }

    /// One pixel; 0 when off-screen
    pub fn read_pixel(&mut self, x: i32, y: i32) -> u16 {
        let mut px = [0u16; 1];
        self.read_rect(x, y, 1, 1, &mut px);
        px[0]
    }

    /// One palette index per byte
    pub fn write_rect_8bpp(&mut self, x: i32, y: i32, w: i32, h: i32, pixels: &[u8], palette: &[u16]) {
        let Some(win) = self.clip.clip_rect(x, y, w, h) else {
            return;
        };
        let (left, top) = (win.x - win.skip_left, win.y - win.skip_rows);
        self.paint_window(&win, |dx, dy| {
            let index = pixels
                .get((dy - top) as usize * w as usize + (dx - left) as usize)
                .copied()
                .unwrap_or(0);
            palette.get(index as usize).copied().unwrap_or(0)
        });
    }

    /// Packed paletted image, `bits_per_pixel` in {1, 2, 4, 8}
    ///
    /// Pixels are MSB first within a byte; each row starts on a byte boundary.
    #[allow(clippy::too_many_arguments)]
    pub fn write_rect_nbpp(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        bits_per_pixel: u8,
        pixels: &[u8],
        palette: &[u16],
    ) {
        if !matches!(bits_per_pixel, 1 | 2 | 4 | 8) {
            return;
        }
        let Some(win) = self.clip.clip_rect(x, y, w, h) else {
            return;
        };
        let bpp = bits_per_pixel as i32;
        let pixels_per_byte = 8 / bpp;
        let bytes_per_row = w / pixels_per_byte + i32::from(w % pixels_per_byte != 0);
        let mask = (1u16 << bpp) - 1;
        let (left, top) = (win.x - win.skip_left, win.y - win.skip_rows);

        self.paint_window(&win, |dx, dy| {
            let (sx, sy) = (dx - left, dy - top);
            let byte = pixels
                .get(sy as usize * bytes_per_row as usize + (sx / pixels_per_byte) as usize)
                .copied()
                .unwrap_or(0);
            let shift = 8 - (sx % pixels_per_byte + 1) * bpp;
            let index = (byte as u16 >> shift) & mask;
            palette.get(index as usize).copied().unwrap_or(0)
        });
    }

    pub fn write_rect_4bpp(&mut self, x: i32, y: i32, w: i32, h: i32, pixels: &[u8], palette: &[u16]) {
        self.write_rect_nbpp(x, y, w, h, 4, pixels, palette);
    }

    pub fn write_rect_2bpp(&mut self, x: i32, y: i32, w: i32, h: i32, pixels: &[u8], palette: &[u16]) {
        self.write_rect_nbpp(x, y, w, h, 2, pixels, palette);
    }

    pub fn write_rect_1bpp(&mut self, x: i32, y: i32, w: i32, h: i32, pixels: &[u8], palette: &[u16]) {
        self.write_rect_nbpp(x, y, w, h, 1, pixels, palette);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLUE, GREEN, RED, WHITE};
    use crate::config::{CanvasConfig, ColorDepth};
    use crate::sink::MemoryPanel;
    use alloc::vec::Vec;

    fn canvas(width: i32, height: i32) -> Canvas<MemoryPanel> {
        Canvas::new(
            MemoryPanel::new(width as usize, height as usize),
            CanvasConfig::new(width, height),
        )
    }

    fn buffered(width: i32, height: i32) -> Canvas<MemoryPanel> {
        let config = CanvasConfig::new(width, height).with_frame_buffer(ColorDepth::Rgb565);
        let mut canvas = Canvas::new(MemoryPanel::new(width as usize, height as usize), config);
        canvas.use_frame_buffer(true).unwrap();
        canvas
    }

    fn ramp(w: i32, h: i32) -> Vec<u16> {
        (0..w * h).map(|i| i as u16 + 1).collect()
    }

    #[test]
    fn test_write_rect_clipped_keeps_stride() {
        for mut c in [canvas(8, 8), buffered(8, 8)] {
            let image = ramp(4, 3);
            c.write_rect(-1, -1, 4, 3, &image);
            c.update_screen();
            // (0,0) shows image pixel (1,1)
            assert_eq!(c.sink().pixel(0, 0), image[5]);
            assert_eq!(c.sink().pixel(2, 1), image[11]);
            assert_eq!(c.sink().pixel(3, 0), 0);
            assert_eq!(c.sink().pixel(0, 2), 0);
        }
    }

    #[test]
    fn test_short_source_stops_on_both_surfaces() {
        let mut direct = canvas(4, 4);
        let mut fb = buffered(4, 4);
        for c in [&mut direct, &mut fb] {
            c.fill_screen(RED);
            c.write_rect(0, 0, 4, 3, &[GREEN; 7]);
            c.write_rect24(0, 3, 2, 1, &[0x0000_00FF]);
            c.update_screen();
        }
        assert_eq!(direct.sink().pixels(), fb.sink().pixels());
        assert_eq!(direct.sink().pixel(3, 0), GREEN);
        assert_eq!(direct.sink().pixel(0, 1), RED);
        assert_eq!(direct.sink().pixel(0, 2), RED);
        assert_eq!(direct.sink().pixel(0, 3), RED);
    }

    #[test]
    fn test_tall_hidden_source_is_ignored() {
        let mut c = canvas(4, 4);
        c.fill_screen(RED);
        // the visible rows would start far beyond the supplied pixels
        c.write_rect(0, -600_000_000, 4, 600_000_004, &[GREEN; 16]);
        c.write_sub_image_rect(0, -600_000_000, 4, 600_000_004, 0, 0, 4, 600_000_004, &[GREEN; 16]);
        assert!(c.sink().pixels().iter().all(|&p| p == RED));

        c.write_rect_8bpp(0, -600_000_000, 4, 600_000_004, &[1; 16], &[BLUE, GREEN]);
        c.write_rect_4bpp(0, -600_000_000, 4, 600_000_004, &[0x11; 8], &[WHITE, GREEN]);
        assert_eq!(c.sink().pixel(0, 0), WHITE);
    }

    #[test]
    fn test_write_rect_center() {
        let mut c = canvas(10, 10);
        c.write_rect(CENTER, CENTER, 2, 2, &[RED, GREEN, BLUE, WHITE]);
        assert_eq!(c.sink().pixel(4, 4), RED);
        assert_eq!(c.sink().pixel(5, 5), WHITE);
    }

    #[test]
    fn test_sub_image_matches_crop() {
        let image = ramp(10, 8);
        let crop: Vec<u16> = (2..6)
            .flat_map(|row| image[row * 10 + 3..row * 10 + 8].to_vec())
            .collect();

        let mut sub = canvas(12, 12);
        sub.set_clip_rect(2, 1, 5, 9);
        sub.write_sub_image_rect(1, -1, 5, 4, 3, 2, 10, 8, &image);

        let mut whole = canvas(12, 12);
        whole.set_clip_rect(2, 1, 5, 9);
        whole.write_rect(1, -1, 5, 4, &crop);

        assert_eq!(sub.sink().pixels(), whole.sink().pixels());
        assert!(sub.sink().pixels().iter().any(|&p| p != 0));
    }

    #[test]
    fn test_read_rect_from_buffer_and_panel() {
        let image = ramp(3, 2);
        let mut fb = buffered(6, 6);
        fb.write_rect(1, 1, 3, 2, &image);
        let mut out = [0u16; 6];
        fb.read_rect(1, 1, 3, 2, &mut out);
        assert_eq!(&out[..], &image[..]);
        assert_eq!(fb.sink().stats().reads, 0);

        let mut direct = canvas(6, 6);
        direct.write_rect(1, 1, 3, 2, &image);
        let mut out = [0u16; 6];
        direct.read_rect(1, 1, 3, 2, &mut out);
        assert_eq!(&out[..], &image[..]);
        assert_eq!(direct.read_pixel(3, 2), image[5]);
        assert_eq!(direct.read_pixel(-1, 0), 0);
    }

    #[test]
    fn test_read_rect_partially_off_screen() {
        let mut c = buffered(4, 4);
        c.fill_screen(RED);
        let mut out = [7u16; 4];
        c.read_rect(3, 3, 2, 2, &mut out);
        assert_eq!(out, [RED, 7, 7, 7]);
    }

    #[test]
    fn test_8bpp_palette() {
        let mut c = canvas(4, 2);
        c.write_rect_8bpp(0, 0, 2, 2, &[0, 1, 2, 3], &[RED, GREEN, BLUE, WHITE]);
        assert_eq!(c.sink().pixel(0, 0), RED);
        assert_eq!(c.sink().pixel(1, 0), GREEN);
        assert_eq!(c.sink().pixel(0, 1), BLUE);
        assert_eq!(c.sink().pixel(1, 1), WHITE);
    }

    #[test]
    fn test_2bpp_left_clip_mid_byte() {
        // 5 pixels per row -> 2 bytes per row: indices 0,1,2,3 | 1
        let pixels = [0b00_01_10_11, 0b01_00_00_00, 0b11_10_01_00, 0b10_00_00_00];
        let palette = [RED, GREEN, BLUE, WHITE];

        let mut c = canvas(8, 4);
        c.write_rect_2bpp(-3, 0, 5, 2, &pixels, &palette);
        assert_eq!(c.sink().pixel(0, 0), WHITE);
        assert_eq!(c.sink().pixel(1, 0), GREEN);
        assert_eq!(c.sink().pixel(2, 0), 0);
        assert_eq!(c.sink().pixel(0, 1), RED);
        assert_eq!(c.sink().pixel(1, 1), BLUE);

        let mut full = canvas(8, 4);
        full.write_rect_2bpp(0, 0, 5, 2, &pixels, &palette);
        let expected = [RED, GREEN, BLUE, WHITE, GREEN, WHITE, BLUE, GREEN, RED, BLUE];
        for (i, &color) in expected.iter().enumerate() {
            assert_eq!(full.sink().pixel(i % 5, i / 5), color);
        }
    }

    #[test]
    fn test_1bpp_and_4bpp() {
        let mut c = canvas(10, 2);
        c.write_rect_1bpp(0, 0, 10, 1, &[0b1000_0001, 0b1000_0000], &[BLUE, RED]);
        assert_eq!(c.sink().pixel(0, 0), RED);
        assert_eq!(c.sink().pixel(1, 0), BLUE);
        assert_eq!(c.sink().pixel(7, 0), RED);
        assert_eq!(c.sink().pixel(8, 0), RED);
        assert_eq!(c.sink().pixel(9, 0), BLUE);

        let mut palette = [0u16; 16];
        palette[0xA] = GREEN;
        palette[0x5] = WHITE;
        c.write_rect_4bpp(0, 1, 3, 1, &[0xA5, 0x50], &palette);
        assert_eq!(c.sink().pixel(0, 1), GREEN);
        assert_eq!(c.sink().pixel(1, 1), WHITE);
        assert_eq!(c.sink().pixel(2, 1), WHITE);
    }

    #[test]
    fn test_nbpp_rejects_odd_depth() {
        let mut c = canvas(4, 4);
        c.write_rect_nbpp(0, 0, 4, 4, 3, &[0xFF; 8], &[RED; 8]);
        assert!(c.sink().pixels().iter().all(|&p| p == 0));
    }
}
