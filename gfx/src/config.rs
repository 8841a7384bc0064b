//! Canvas configuration
//!
//! Everything that has to be decided before the first pixel is drawn lives
//! here: panel geometry, whether a shadow frame buffer may be used and how
//! it is flushed.

// =============================================================================
// Constants
// =============================================================================

/// Default panel width in pixels (rotation 0)
pub const TFT_WIDTH: i32 = 320;
/// Default panel height in pixels (rotation 0)
pub const TFT_HEIGHT: i32 = 480;

/// Byte alignment of internally allocated frame buffers
pub const FRAME_BUFFER_ALIGN: usize = 32;

/// Coordinate sentinel: center the item on that axis
pub const CENTER: i32 = 9998;

// =============================================================================
// Color depth of the shadow buffer
// =============================================================================

/// Storage format of the shadow frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    /// 16-bit RGB565, one `u16` per pixel
    Rgb565,
    /// 24-bit RGB888 stored as `0xFFRRGGBB` in one `u32` per pixel
    Rgb888,
}

impl ColorDepth {
    /// Bytes used by one pixel in memory
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            ColorDepth::Rgb565 => 2,
            ColorDepth::Rgb888 => 4,
        }
    }
}

// =============================================================================
// CanvasConfig
// =============================================================================

/// Construction-time canvas settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasConfig {
    /// Panel width at rotation 0
    pub width: i32,
    /// Panel height at rotation 0
    pub height: i32,
    /// Shadow buffer capability. `None` means direct streaming only.
    pub frame_buffer: Option<ColorDepth>,
    /// Flush only the dirty rectangle instead of the whole clip area
    pub update_changed_only: bool,
    /// Initial text wrap setting
    pub wrap: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: TFT_WIDTH,
            height: TFT_HEIGHT,
            frame_buffer: None,
            update_changed_only: false,
            wrap: true,
        }
    }
}

impl CanvasConfig {
    /// Config for a panel of the given native size, no frame buffer
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Allow a shadow frame buffer of the given depth
    pub fn with_frame_buffer(mut self, depth: ColorDepth) -> Self {
        self.frame_buffer = Some(depth);
        self
    }

    /// Select dirty-rectangle flushing
    pub fn changed_only(mut self, enabled: bool) -> Self {
        self.update_changed_only = enabled;
        self
    }

    /// Initial text wrap
    pub fn wrap(mut self, enabled: bool) -> Self {
        self.wrap = enabled;
        self
    }

    /// Number of pixels in the panel
    pub fn pixel_count(&self) -> usize {
        self.width.max(0) as usize * self.height.max(0) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CanvasConfig::default();
        assert_eq!(config.width, TFT_WIDTH);
        assert_eq!(config.height, TFT_HEIGHT);
        assert!(config.frame_buffer.is_none());
        assert!(config.wrap);
    }

    #[test]
    fn test_builder() {
        let config = CanvasConfig::new(64, 32)
            .with_frame_buffer(ColorDepth::Rgb888)
            .changed_only(true)
            .wrap(false);
        assert_eq!(config.frame_buffer, Some(ColorDepth::Rgb888));
        assert!(config.update_changed_only);
        assert!(!config.wrap);
        assert_eq!(config.pixel_count(), 64 * 32);
        assert_eq!(ColorDepth::Rgb888.bytes_per_pixel(), 4);
    }
}
