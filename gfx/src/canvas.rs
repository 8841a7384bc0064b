//! Canvas
//!
//! Owns the display sink, the clip region, the optional shadow mirror and
//! the text state. Every primitive clips in logical coordinates, then hands
//! a display-space window to [`Surface`], which decides whether it goes to
//! the panel or to memory.
//!
//! Shapes, bitmaps and text live in their own modules as further
//! `impl Canvas` blocks.

use core::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::Rgb565,
    primitives::Rectangle,
    Pixel,
};

use crate::clip::{ClipRegion, Window};
use crate::color::{color565_to_888, from_rgb565};
use crate::config::{CanvasConfig, CENTER};
use crate::error::FrameBufferError;
use crate::mirror::FrameMirror;
use crate::sink::DisplaySink;
use crate::surface::Surface;
use crate::text::TextState;

pub struct Canvas<S: DisplaySink> {
    sink: S,
    native_width: i32,
    native_height: i32,
    width: i32,
    height: i32,
    rotation: u8,
    pub(crate) clip: ClipRegion,
    mirror: Option<FrameMirror>,
    pub(crate) text: TextState,
}

impl<S: DisplaySink> Canvas<S> {
    /// Create a canvas drawing to `sink`
    pub fn new(sink: S, config: CanvasConfig) -> Self {
        let width = config.width.max(0);
        let height = config.height.max(0);
        Self {
            sink,
            native_width: width,
            native_height: height,
            width,
            height,
            rotation: 0,
            clip: ClipRegion::new(width, height),
            mirror: config
                .frame_buffer
                .map(|depth| FrameMirror::new(depth, config.update_changed_only)),
            text: TextState::new(config.wrap),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Give the sink back
    pub fn release(self) -> S {
        self.sink
    }

    /// Logical width (after rotation)
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Logical height (after rotation)
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    /// Rotate by `rotation * 90` degrees
    ///
    /// Resets origin, clip and text cursor. The shadow buffer keeps its
    /// pixels but is reinterpreted with the new dimensions.
    pub fn set_rotation(&mut self, rotation: u8) {
        self.rotation = rotation & 3;
        if self.rotation & 1 == 0 {
            self.width = self.native_width;
            self.height = self.native_height;
        } else {
            self.width = self.native_height;
            self.height = self.native_width;
        }
        self.sink.set_rotation(self.rotation);
        self.clip.resize(self.width, self.height);
        self.text.home();
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.reshape(self.width as usize, self.height as usize);
        }
        log::debug!("rotation {} -> {}x{}", self.rotation, self.width, self.height);
    }

    // =========================================================================
    // Clip and origin
    // =========================================================================

    pub fn clip(&self) -> &ClipRegion {
        &self.clip
    }

    pub fn set_origin(&mut self, x: i32, y: i32) {
        self.clip.set_origin(x, y);
    }

    pub fn origin(&self) -> (i32, i32) {
        self.clip.origin()
    }

    /// Clip rectangle relative to the origin
    pub fn set_clip_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.clip.set_clip_rect(x, y, w, h);
    }

    pub fn reset_clip(&mut self) {
        self.clip.reset_clip();
    }

    // =========================================================================
    // Frame buffer
    // =========================================================================

    pub(crate) fn surface(&mut self) -> Surface<'_, S> {
        match self.mirror.as_mut() {
            Some(mirror) if mirror.is_enabled() => Surface::Mirror(mirror),
            _ => Surface::Direct(&mut self.sink),
        }
    }

    /// Canvas was configured with a frame buffer depth
    pub fn has_frame_buffer(&self) -> bool {
        self.mirror.is_some()
    }

    /// Drawing currently goes to the frame buffer
    pub fn frame_buffer_enabled(&self) -> bool {
        self.mirror.as_ref().is_some_and(FrameMirror::is_enabled)
    }

    pub fn frame_buffer(&self) -> Option<&FrameMirror> {
        self.mirror.as_ref()
    }

    /// Switch frame buffer mode; the first enable allocates
    ///
    /// # Returns
    /// * `Ok(true)` when drawing now goes to the buffer
    /// * `Ok(false)` after disabling
    /// * `Err(FrameBufferError)` if the buffer is unavailable; the canvas
    ///   keeps streaming directly
    pub fn use_frame_buffer(&mut self, enable: bool) -> Result<bool, FrameBufferError> {
        if !enable {
            if let Some(mirror) = self.mirror.as_mut() {
                mirror.disable();
            }
            return Ok(false);
        }
        let (width, height) = (self.width as usize, self.height as usize);
        let mirror = self.mirror.as_mut().ok_or(FrameBufferError::NotConfigured)?;
        mirror.enable(width, height)?;
        Ok(true)
    }

    /// Supply 16-bit storage; does not change the enabled state
    pub fn set_frame_buffer(&mut self, pixels: &'static mut [u16]) -> Result<(), FrameBufferError> {
        let (width, height) = (self.width as usize, self.height as usize);
        self.mirror
            .as_mut()
            .ok_or(FrameBufferError::NotConfigured)?
            .attach_565(pixels, width, height)
    }

    /// Supply 32-bit storage; does not change the enabled state
    pub fn set_frame_buffer_888(&mut self, pixels: &'static mut [u32]) -> Result<(), FrameBufferError> {
        let (width, height) = (self.width as usize, self.height as usize);
        self.mirror
            .as_mut()
            .ok_or(FrameBufferError::NotConfigured)?
            .attach_888(pixels, width, height)
    }

    /// Release an internally allocated buffer and go back to direct mode
    pub fn free_frame_buffer(&mut self) {
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.free();
        }
    }

    pub fn set_update_changed_only(&mut self, enabled: bool) {
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.set_update_changed_only(enabled);
        }
    }

    /// Inclusive dirty bounds of the frame buffer
    pub fn dirty_rect(&self) -> Option<(i32, i32, i32, i32)> {
        self.mirror.as_ref().and_then(|mirror| mirror.dirty().bounds())
    }

    /// Push the frame buffer to the panel; no-op in direct mode
    pub fn update_screen(&mut self) {
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.flush(&mut self.sink, &self.clip);
        }
    }

    /// Start a background transfer of the whole frame buffer
    ///
    /// Continuous updates are not supported and return `false`, as does a
    /// request while a previous transfer is still running.
    pub fn update_screen_async(&mut self, continuous: bool) -> bool {
        if continuous {
            log::warn!("continuous async update not supported");
            return false;
        }
        let Some(mirror) = self.mirror.as_mut() else {
            return false;
        };
        if !mirror.is_enabled() {
            return false;
        }
        if self.sink.write_rect_async_active() {
            log::warn!("async update already active");
            return false;
        }
        mirror.flush_async(&mut self.sink)
    }

    /// Poll the sink's background transfer
    pub fn update_async_active(&mut self) -> bool {
        self.sink.write_rect_async_active()
    }

    /// Busy-wait for the background transfer to finish
    pub fn wait_update_async_complete(&mut self) {
        while self.sink.write_rect_async_active() {
            core::hint::spin_loop();
        }
    }

    /// Stop continuous updates (none are ever started)
    pub fn end_update_async(&mut self) {}

    // =========================================================================
    // Primitives (RGB565)
    // =========================================================================

    pub fn draw_pixel(&mut self, x: i32, y: i32, color: u16) {
        if let Some((dx, dy)) = self.clip.clip_point(x, y) {
            self.surface().fill(&unit(dx, dy), color);
        }
    }

    pub fn draw_fast_hline(&mut self, x: i32, y: i32, w: i32, color: u16) {
        if let Some(win) = self.clip.clip_rect(x, y, w, 1) {
            self.surface().fill(&win, color);
        }
    }

    pub fn draw_fast_vline(&mut self, x: i32, y: i32, h: i32, color: u16) {
        if let Some(win) = self.clip.clip_rect(x, y, 1, h) {
            self.surface().fill(&win, color);
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u16) {
        if let Some(win) = self.clip.clip_rect(x, y, w, h) {
            self.surface().fill(&win, color);
        }
    }

    pub fn fill_screen(&mut self, color: u16) {
        self.fill_rect(0, 0, self.width, self.height, color);
    }

    /// Fill a window already in display coordinates
    pub(crate) fn fill_window(&mut self, win: &Window, color: u16) {
        self.surface().fill(win, color);
    }

    /// Paint a display-space window pixel by pixel
    pub(crate) fn paint_window(&mut self, win: &Window, color_at: impl FnMut(i32, i32) -> u16) {
        self.surface().paint(win, color_at);
    }

    // =========================================================================
    // Primitives (RGB888)
    // =========================================================================

    pub fn draw_pixel24(&mut self, x: i32, y: i32, color: u32) {
        if let Some((dx, dy)) = self.clip.clip_point(x, y) {
            self.surface().fill_888(&unit(dx, dy), color);
        }
    }

    pub fn draw_fast_hline24(&mut self, x: i32, y: i32, w: i32, color: u32) {
        self.fill_rect24(x, y, w, 1, color);
    }

    pub fn draw_fast_vline24(&mut self, x: i32, y: i32, h: i32, color: u32) {
        self.fill_rect24(x, y, 1, h, color);
    }

    pub fn fill_rect24(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        if let Some(win) = self.clip.clip_rect(x, y, w, h) {
            self.surface().fill_888(&win, color);
        }
    }

    /// Blit `w x h` 32-bit pixels; `CENTER` centers on that axis
    pub fn write_rect24(&mut self, x: i32, y: i32, w: i32, h: i32, pixels: &[u32]) {
        let x = if x == CENTER { (self.width - w) / 2 } else { x };
        let y = if y == CENTER { (self.height - h) / 2 } else { y };
        if let Some(win) = self.clip.clip_rect(x, y, w, h) {
            let start = win.source_offset(w as usize);
            if let Some(src) = pixels.get(start..) {
                self.surface().write_888(&win, src, w as usize);
            }
        }
    }

    /// Pixel as `0xFFRRGGBB`
    pub fn read_pixel24(&mut self, x: i32, y: i32) -> u32 {
        if let Some(mirror) = self.mirror.as_ref().filter(|m| m.is_enabled()) {
            let (ox, oy) = self.clip.origin();
            return mirror.pixel_888(x + ox, y + oy).unwrap_or(0);
        }
        color565_to_888(self.read_pixel(x, y))
    }
}

#[inline]
fn unit(x: i32, y: i32) -> Window {
    Window { x, y, w: 1, h: 1, skip_rows: 0, skip_left: 0, skip_right: 0 }
}

// =============================================================================
// embedded-graphics support
// =============================================================================

impl<S: DisplaySink> OriginDimensions for Canvas<S> {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl<S: DisplaySink> DrawTarget for Canvas<S> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels {
            self.draw_pixel(coord.x, coord.y, from_rgb565(color));
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(
            area.top_left.x,
            area.top_left.y,
            area.size.width as i32,
            area.size.height as i32,
            from_rgb565(color),
        );
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_screen(from_rgb565(color));
        Ok(())
    }
}
