//! Shadow frame buffer
//!
//! When enabled, drawing lands in memory instead of on the panel and the
//! touched area is accumulated in a [`DirtyRect`]. [`FrameMirror::flush`]
//! then pushes either the whole clip area or only the dirty part to the
//! sink.
//!
//! The buffer depth (RGB565 or RGB888) is fixed when the canvas is built.
//! The storage itself is allocated lazily on first enable, or supplied by
//! the caller.

use crate::buffer::{PixelBuffer, PixelWord};
use crate::clip::{ClipRegion, Window};
use crate::color::{color565_to_888, color888_to_565};
use crate::config::ColorDepth;
use crate::dirty::DirtyRect;
use crate::error::FrameBufferError;
use crate::sink::DisplaySink;

/// Pixel storage of the mirror, one variant per depth
pub enum FrameStore {
    Rgb565(PixelBuffer<u16>),
    Rgb888(PixelBuffer<u32>),
}

impl FrameStore {
    fn allocate(depth: ColorDepth, width: usize, height: usize) -> Result<Self, FrameBufferError> {
        match depth {
            ColorDepth::Rgb565 => PixelBuffer::allocate(width, height).map(FrameStore::Rgb565),
            ColorDepth::Rgb888 => PixelBuffer::allocate(width, height).map(FrameStore::Rgb888),
        }
    }

    fn is_owned(&self) -> bool {
        match self {
            FrameStore::Rgb565(buf) => buf.is_owned(),
            FrameStore::Rgb888(buf) => buf.is_owned(),
        }
    }

    fn reshape(&mut self, width: usize, height: usize) -> bool {
        match self {
            FrameStore::Rgb565(buf) => buf.reshape(width, height),
            FrameStore::Rgb888(buf) => buf.reshape(width, height),
        }
    }
}

pub struct FrameMirror {
    depth: ColorDepth,
    store: Option<FrameStore>,
    dirty: DirtyRect,
    enabled: bool,
    update_changed_only: bool,
}

impl FrameMirror {
    pub fn new(depth: ColorDepth, update_changed_only: bool) -> Self {
        Self {
            depth,
            store: None,
            dirty: DirtyRect::new(),
            enabled: false,
            update_changed_only,
        }
    }

    pub fn depth(&self) -> ColorDepth {
        self.depth
    }

    /// Drawing currently goes to the mirror
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled && self.store.is_some()
    }

    pub fn is_allocated(&self) -> bool {
        self.store.is_some()
    }

    pub fn update_changed_only(&self) -> bool {
        self.update_changed_only
    }

    pub fn set_update_changed_only(&mut self, enabled: bool) {
        self.update_changed_only = enabled;
    }

    pub fn dirty(&self) -> &DirtyRect {
        &self.dirty
    }

    pub fn store(&self) -> Option<&FrameStore> {
        self.store.as_ref()
    }

    /// Start drawing into the mirror, allocating it on first use
    pub fn enable(&mut self, width: usize, height: usize) -> Result<(), FrameBufferError> {
        if self.store.is_none() {
            match FrameStore::allocate(self.depth, width, height) {
                Ok(store) => {
                    log::debug!("frame buffer allocated: {}x{} {:?}", width, height, self.depth);
                    self.store = Some(store);
                }
                Err(err) => {
                    log::warn!("frame buffer allocation failed: {}x{} {:?}", width, height, self.depth);
                    return Err(err);
                }
            }
        }
        self.enabled = true;
        self.dirty.reset();
        Ok(())
    }

    /// Go back to direct streaming; storage is kept
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Release an internally allocated buffer
    ///
    /// Caller-supplied storage is never released; returns whether anything
    /// was freed.
    pub fn free(&mut self) -> bool {
        if self.store.as_ref().is_some_and(FrameStore::is_owned) {
            self.store = None;
            self.enabled = false;
            log::debug!("frame buffer freed");
            return true;
        }
        false
    }

    /// Use caller storage for a 16-bit mirror
    pub fn attach_565(&mut self, pixels: &'static mut [u16], width: usize, height: usize) -> Result<(), FrameBufferError> {
        if self.depth != ColorDepth::Rgb565 {
            return Err(FrameBufferError::DepthMismatch);
        }
        self.store = Some(FrameStore::Rgb565(PixelBuffer::from_static(pixels, width, height)?));
        log::debug!("external 16-bit frame buffer attached");
        Ok(())
    }

    /// Use caller storage for a 32-bit mirror
    pub fn attach_888(&mut self, pixels: &'static mut [u32], width: usize, height: usize) -> Result<(), FrameBufferError> {
        if self.depth != ColorDepth::Rgb888 {
            return Err(FrameBufferError::DepthMismatch);
        }
        self.store = Some(FrameStore::Rgb888(PixelBuffer::from_static(pixels, width, height)?));
        log::debug!("external 32-bit frame buffer attached");
        Ok(())
    }

    /// Follow a rotation change
    ///
    /// The panel no longer matches the reinterpreted pixels, so the whole
    /// buffer becomes dirty.
    pub fn reshape(&mut self, width: usize, height: usize) {
        let Some(store) = self.store.as_mut() else {
            self.dirty.reset();
            return;
        };
        store.reshape(width, height);
        self.dirty.include(0, 0, width as i32, height as i32);
    }

    // =========================================================================
    // Pixel access (display coordinates, already clipped)
    // =========================================================================

    pub fn fill(&mut self, win: &Window, color: u16) {
        match self.store.as_mut() {
            Some(FrameStore::Rgb565(buf)) => buf.fill(win, color),
            Some(FrameStore::Rgb888(buf)) => buf.fill(win, color565_to_888(color)),
            None => return,
        }
        self.dirty.include(win.x, win.y, win.w, win.h);
    }

    pub fn fill_888(&mut self, win: &Window, color: u32) {
        match self.store.as_mut() {
            Some(FrameStore::Rgb565(buf)) => buf.fill(win, color888_to_565(color)),
            Some(FrameStore::Rgb888(buf)) => buf.fill(win, color | 0xFF00_0000),
            None => return,
        }
        self.dirty.include(win.x, win.y, win.w, win.h);
    }

    pub fn write_565(&mut self, win: &Window, src: &[u16], stride: usize) {
        match self.store.as_mut() {
            Some(FrameStore::Rgb565(buf)) => buf.write_from(win, src, stride, |c| c),
            Some(FrameStore::Rgb888(buf)) => buf.write_from(win, src, stride, color565_to_888),
            None => return,
        }
        self.dirty.include(win.x, win.y, win.w, win.h);
    }

    pub fn write_888(&mut self, win: &Window, src: &[u32], stride: usize) {
        match self.store.as_mut() {
            Some(FrameStore::Rgb565(buf)) => buf.write_from(win, src, stride, color888_to_565),
            Some(FrameStore::Rgb888(buf)) => buf.write_from(win, src, stride, |c| c | 0xFF00_0000),
            None => return,
        }
        self.dirty.include(win.x, win.y, win.w, win.h);
    }

    pub fn paint(&mut self, win: &Window, mut color_at: impl FnMut(i32, i32) -> u16) {
        match self.store.as_mut() {
            Some(FrameStore::Rgb565(buf)) => buf.paint(win, color_at),
            Some(FrameStore::Rgb888(buf)) => buf.paint(win, |x, y| color565_to_888(color_at(x, y))),
            None => return,
        }
        self.dirty.include(win.x, win.y, win.w, win.h);
    }

    /// Pixel as RGB565
    pub fn pixel(&self, x: i32, y: i32) -> Option<u16> {
        match self.store.as_ref()? {
            FrameStore::Rgb565(buf) => buf.get(x, y),
            FrameStore::Rgb888(buf) => buf.get(x, y).map(PixelWord::to_565),
        }
    }

    /// Native 32-bit pixel (RGB565 storage is expanded)
    pub fn pixel_888(&self, x: i32, y: i32) -> Option<u32> {
        match self.store.as_ref()? {
            FrameStore::Rgb565(buf) => buf.get(x, y).map(color565_to_888),
            FrameStore::Rgb888(buf) => buf.get(x, y),
        }
    }

    pub fn read(&self, win: &Window, out: &mut [u16], stride: usize) {
        match self.store.as_ref() {
            Some(FrameStore::Rgb565(buf)) => buf.read_into(win, out, stride, |c| c),
            Some(FrameStore::Rgb888(buf)) => buf.read_into(win, out, stride, color888_to_565),
            None => {}
        }
    }

    // =========================================================================
    // Flush
    // =========================================================================

    /// Push the mirror to the panel and clear the dirty rectangle
    ///
    /// Full mode sends the display clip area (one bulk write when it is the
    /// whole screen). Changed-only mode sends the dirty rectangle clipped to
    /// the display clip, or nothing if it is empty.
    pub fn flush<S: DisplaySink>(&mut self, sink: &mut S, clip: &ClipRegion) {
        if !self.is_enabled() {
            return;
        }
        let (cx1, cy1, cx2, cy2) = clip.display_clip();

        if self.update_changed_only {
            if let Some((x1, y1, x2, y2)) = self.dirty.clipped(cx1, cy1, cx2, cy2) {
                log::trace!("flush dirty ({}, {})-({}, {})", x1, y1, x2, y2);
                self.stream(sink, x1, y1, x2, y2);
            }
        } else if clip.is_standard() {
            log::trace!("flush full screen");
            match self.store.as_ref() {
                Some(FrameStore::Rgb565(buf)) => {
                    sink.write_rect(0, 0, buf.width() as u16, buf.height() as u16, buf.pixels());
                }
                Some(FrameStore::Rgb888(buf)) => {
                    let (x2, y2) = (buf.width() as i32 - 1, buf.height() as i32 - 1);
                    self.stream(sink, 0, 0, x2, y2);
                }
                None => {}
            }
        } else if !clip.is_invisible() {
            log::trace!("flush clip ({}, {})-({}, {})", cx1, cy1, cx2 - 1, cy2 - 1);
            self.stream(sink, cx1, cy1, cx2 - 1, cy2 - 1);
        }

        self.dirty.reset();
    }

    /// Stream an inclusive region row by row in one address window
    fn stream<S: DisplaySink>(&self, sink: &mut S, x1: i32, y1: i32, x2: i32, y2: i32) {
        let w = x2 - x1 + 1;
        sink.set_addr(x1 as u16, y1 as u16, x2 as u16, y2 as u16);
        sink.begin_write();
        for y in y1..=y2 {
            match self.store.as_ref() {
                Some(FrameStore::Rgb565(buf)) => {
                    if let Some(row) = buf.span(x1, y, w) {
                        row.iter().for_each(|&c| sink.write_color(c));
                    }
                }
                Some(FrameStore::Rgb888(buf)) => {
                    if let Some(row) = buf.span(x1, y, w) {
                        row.iter().for_each(|&c| sink.write_color(color888_to_565(c)));
                    }
                }
                None => {}
            }
        }
        sink.end_write();
    }

    /// Hand the whole 16-bit buffer to the sink's background transfer
    pub fn flush_async<S: DisplaySink>(&mut self, sink: &mut S) -> bool {
        if !self.is_enabled() {
            return false;
        }
        match self.store.as_ref() {
            Some(FrameStore::Rgb565(buf)) => {
                let started = sink.write_rect_async(0, 0, buf.width() as u16, buf.height() as u16, buf.pixels());
                if started {
                    self.dirty.reset();
                }
                started
            }
            _ => {
                log::warn!("async flush needs a 16-bit frame buffer");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemoryPanel;
    use alloc::boxed::Box;
    use alloc::vec;

    fn window(x: i32, y: i32, w: i32, h: i32) -> Window {
        Window { x, y, w, h, skip_rows: 0, skip_left: 0, skip_right: 0 }
    }

    #[test]
    fn test_enable_allocates_once() {
        let mut mirror = FrameMirror::new(ColorDepth::Rgb565, false);
        assert!(!mirror.is_enabled());
        mirror.enable(8, 8).unwrap();
        assert!(mirror.is_enabled());
        mirror.fill(&window(0, 0, 1, 1), 0x1234);
        mirror.disable();
        mirror.enable(8, 8).unwrap();
        assert_eq!(mirror.pixel(0, 0), Some(0x1234));
        assert!(mirror.dirty().is_empty());
    }

    #[test]
    fn test_free_only_owned() {
        let mut mirror = FrameMirror::new(ColorDepth::Rgb565, false);
        let pixels: &'static mut [u16] = Box::leak(vec![0u16; 16].into_boxed_slice());
        mirror.attach_565(pixels, 4, 4).unwrap();
        assert!(!mirror.free());
        assert!(mirror.is_allocated());

        let mut owned = FrameMirror::new(ColorDepth::Rgb888, false);
        owned.enable(4, 4).unwrap();
        assert!(owned.free());
        assert!(!owned.is_enabled());
        assert!(!owned.is_allocated());
    }

    #[test]
    fn test_attach_depth_mismatch() {
        let mut mirror = FrameMirror::new(ColorDepth::Rgb888, false);
        let pixels: &'static mut [u16] = Box::leak(vec![0u16; 16].into_boxed_slice());
        assert_eq!(mirror.attach_565(pixels, 4, 4), Err(FrameBufferError::DepthMismatch));
    }

    #[test]
    fn test_writes_mark_dirty() {
        let mut mirror = FrameMirror::new(ColorDepth::Rgb565, true);
        mirror.enable(10, 10).unwrap();
        mirror.fill(&window(2, 3, 2, 2), 1);
        mirror.paint(&window(7, 8, 1, 1), |_, _| 2);
        assert_eq!(mirror.dirty().bounds(), Some((2, 3, 7, 8)));
    }

    #[test]
    fn test_changed_only_flush_streams_dirty_rows() {
        let mut mirror = FrameMirror::new(ColorDepth::Rgb565, true);
        let mut panel = MemoryPanel::new(10, 10);
        let clip = ClipRegion::new(10, 10);
        mirror.enable(10, 10).unwrap();
        mirror.fill(&window(2, 2, 3, 2), 0xF800);

        mirror.flush(&mut panel, &clip);
        assert_eq!(panel.stats().pixels, 6);
        assert_eq!(panel.pixel(4, 3), 0xF800);
        assert_eq!(panel.pixel(5, 3), 0);
        assert!(mirror.dirty().is_empty());

        panel.reset_stats();
        mirror.flush(&mut panel, &clip);
        assert_eq!(panel.stats().pixels, 0);
    }

    #[test]
    fn test_full_flush_888_quantizes() {
        let mut mirror = FrameMirror::new(ColorDepth::Rgb888, false);
        let mut panel = MemoryPanel::new(4, 2);
        let clip = ClipRegion::new(4, 2);
        mirror.enable(4, 2).unwrap();
        mirror.fill_888(&window(0, 0, 4, 2), 0x00FF_0000);
        mirror.flush(&mut panel, &clip);
        assert!(panel.pixels().iter().all(|&p| p == 0xF800));
        assert_eq!(panel.stats().pixels, 8);
    }

    #[test]
    fn test_reshape_marks_everything_dirty() {
        let mut mirror = FrameMirror::new(ColorDepth::Rgb565, true);
        mirror.enable(8, 4).unwrap();
        mirror.fill(&window(0, 0, 2, 2), 0xF800);
        mirror.reshape(4, 8);
        assert_eq!(mirror.dirty().bounds(), Some((0, 0, 3, 7)));

        let mut unallocated = FrameMirror::new(ColorDepth::Rgb565, true);
        unallocated.reshape(4, 8);
        assert!(unallocated.dirty().is_empty());
    }

    #[test]
    fn test_flush_disabled_is_noop() {
        let mut mirror = FrameMirror::new(ColorDepth::Rgb565, false);
        let mut panel = MemoryPanel::new(4, 4);
        mirror.flush(&mut panel, &ClipRegion::new(4, 4));
        assert_eq!(panel.stats().transactions, 0);
        assert!(!mirror.flush_async(&mut panel));
    }
}
