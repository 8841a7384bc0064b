//! Display sink abstraction
//!
//! The canvas never touches a bus. Everything that leaves the library goes
//! through [`DisplaySink`]: an address window followed by a stream of RGB565
//! words, plus bulk helpers a driver may accelerate.
//!
//! [`MemoryPanel`] is an in-memory sink that behaves like a panel's GRAM.
//! It backs the emulator path and the test suite.

use alloc::vec;
use alloc::vec::Vec;

/// Display sink trait
///
/// Implemented by panel drivers (parallel bus, DMA engines, emulators)
pub trait DisplaySink {
    /// Open an address window, both corners inclusive
    fn set_addr(&mut self, x0: u16, y0: u16, x1: u16, y1: u16);

    /// Start streaming pixels into the current window
    fn begin_write(&mut self);

    /// Stream one pixel; the write position advances row-major in the window
    fn write_color(&mut self, color: u16);

    /// Finish the stream
    fn end_write(&mut self);

    /// Write a `w x h` block of contiguous pixels
    ///
    /// # Arguments
    /// * `x`, `y` - Top-left corner in panel coordinates
    /// * `w`, `h` - Block size, both nonzero
    /// * `pixels` - At least `w * h` RGB565 words, row-major
    fn write_rect(&mut self, x: u16, y: u16, w: u16, h: u16, pixels: &[u16]) {
        if w == 0 || h == 0 {
            return;
        }
        self.set_addr(x, y, x + w - 1, y + h - 1);
        self.begin_write();
        for &color in pixels.iter().take(w as usize * h as usize) {
            self.write_color(color);
        }
        self.end_write();
    }

    /// Read a `w x h` block back from the panel into `out` (row-major)
    fn read_rect(&mut self, x: u16, y: u16, w: u16, h: u16, out: &mut [u16]);

    /// Fill a block with one color
    fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, color: u16) {
        if w == 0 || h == 0 {
            return;
        }
        self.set_addr(x, y, x + w - 1, y + h - 1);
        self.begin_write();
        for _ in 0..w as usize * h as usize {
            self.write_color(color);
        }
        self.end_write();
    }

    /// Start a background transfer of `pixels`
    ///
    /// # Returns
    /// * `true` if the transfer was started (or completed synchronously)
    /// * `false` if the sink refused it
    fn write_rect_async(&mut self, x: u16, y: u16, w: u16, h: u16, pixels: &[u16]) -> bool {
        self.write_rect(x, y, w, h, pixels);
        true
    }

    /// Poll whether a background transfer is still running
    fn write_rect_async_active(&mut self) -> bool {
        false
    }

    /// Panel rotation changed (0..=3)
    fn set_rotation(&mut self, _rotation: u8) {}
}

// =============================================================================
// MemoryPanel
// =============================================================================

/// Transfer counters kept by [`MemoryPanel`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PanelStats {
    /// Number of `begin_write` calls
    pub transactions: usize,
    /// Pixels streamed through `write_color`
    pub pixels: usize,
    /// Started async transfers
    pub async_transfers: usize,
    /// `read_rect` calls
    pub reads: usize,
}

/// GRAM-like sink backed by a `Vec<u16>`
pub struct MemoryPanel {
    width: usize,
    height: usize,
    rotation: u8,
    pixels: Vec<u16>,
    window: (u16, u16, u16, u16),
    cursor: (u16, u16),
    async_latency: u32,
    async_remaining: u32,
    stats: PanelStats,
}

impl MemoryPanel {
    /// Black panel of the given native size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rotation: 0,
            pixels: vec![0; width * height],
            window: (0, 0, 0, 0),
            cursor: (0, 0),
            async_latency: 0,
            async_remaining: 0,
            stats: PanelStats::default(),
        }
    }

    /// Async transfers stay active for this many polls
    pub fn with_async_latency(mut self, polls: u32) -> Self {
        self.async_latency = polls;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    /// Pixel at panel coordinates, 0 when out of range
    pub fn pixel(&self, x: usize, y: usize) -> u16 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.pixels[y * self.width + x]
    }

    /// Raw GRAM contents
    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    pub fn stats(&self) -> PanelStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = PanelStats::default();
    }
}

impl DisplaySink for MemoryPanel {
    fn set_addr(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) {
        self.window = (x0, y0, x1, y1);
        self.cursor = (x0, y0);
    }

    fn begin_write(&mut self) {
        self.stats.transactions += 1;
    }

    fn write_color(&mut self, color: u16) {
        let (x0, _, x1, y1) = self.window;
        let (x, y) = self.cursor;
        if y <= y1 && (x as usize) < self.width && (y as usize) < self.height {
            self.pixels[y as usize * self.width + x as usize] = color;
        }
        self.stats.pixels += 1;
        if x >= x1 {
            self.cursor = (x0, y.saturating_add(1));
        } else {
            self.cursor = (x + 1, y);
        }
    }

    fn end_write(&mut self) {}

    fn read_rect(&mut self, x: u16, y: u16, w: u16, h: u16, out: &mut [u16]) {
        self.stats.reads += 1;
        for row in 0..h as usize {
            for col in 0..w as usize {
                if let Some(dst) = out.get_mut(row * w as usize + col) {
                    *dst = self.pixel(x as usize + col, y as usize + row);
                }
            }
        }
    }

    fn write_rect_async(&mut self, x: u16, y: u16, w: u16, h: u16, pixels: &[u16]) -> bool {
        self.write_rect(x, y, w, h, pixels);
        self.stats.async_transfers += 1;
        self.async_remaining = self.async_latency;
        true
    }

    fn write_rect_async_active(&mut self) -> bool {
        if self.async_remaining > 0 {
            self.async_remaining -= 1;
            true
        } else {
            false
        }
    }

    fn set_rotation(&mut self, rotation: u8) {
        let rotation = rotation & 3;
        if (rotation ^ self.rotation) & 1 == 1 {
            core::mem::swap(&mut self.width, &mut self.height);
        }
        self.rotation = rotation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_wraps_inside_window() {
        let mut panel = MemoryPanel::new(4, 4);
        panel.set_addr(1, 1, 2, 2);
        panel.begin_write();
        for c in 1..=4 {
            panel.write_color(c);
        }
        panel.end_write();
        assert_eq!(panel.pixel(1, 1), 1);
        assert_eq!(panel.pixel(2, 1), 2);
        assert_eq!(panel.pixel(1, 2), 3);
        assert_eq!(panel.pixel(2, 2), 4);
        assert_eq!(panel.pixel(0, 0), 0);
        assert_eq!(panel.stats().pixels, 4);
        assert_eq!(panel.stats().transactions, 1);
    }

    #[test]
    fn test_default_fill_and_read() {
        let mut panel = MemoryPanel::new(3, 3);
        panel.fill_rect(0, 1, 3, 2, 0xF800);
        let mut out = [0u16; 3];
        panel.read_rect(0, 2, 3, 1, &mut out);
        assert_eq!(out, [0xF800; 3]);
        assert_eq!(panel.pixel(0, 0), 0);
    }

    #[test]
    fn test_async_latency() {
        let mut panel = MemoryPanel::new(2, 1).with_async_latency(2);
        assert!(panel.write_rect_async(0, 0, 2, 1, &[5, 6]));
        assert!(panel.write_rect_async_active());
        assert!(panel.write_rect_async_active());
        assert!(!panel.write_rect_async_active());
        assert_eq!(panel.pixels(), &[5, 6]);
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        let mut panel = MemoryPanel::new(4, 2);
        panel.set_rotation(1);
        assert_eq!((panel.width(), panel.height()), (2, 4));
        panel.set_rotation(3);
        assert_eq!((panel.width(), panel.height()), (2, 4));
        panel.set_rotation(2);
        assert_eq!((panel.width(), panel.height()), (4, 2));
    }
}
