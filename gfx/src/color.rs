//! Color helpers
//!
//! The canvas speaks RGB565 natively. This module holds the packing
//! helpers, the RGB888 expansion used by 32-bit frame buffers, the 14-bit
//! per channel form used for gradient interpolation and the prexpanded
//! form used for alpha blending of anti-aliased glyphs.

use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::{IntoStorage, Rgb565, Rgb888, RgbColor};

// =============================================================================
// Named colors (RGB565)
// =============================================================================

pub const BLACK: u16 = 0x0000;
pub const NAVY: u16 = 0x000F;
pub const DARKGREEN: u16 = 0x03E0;
pub const DARKCYAN: u16 = 0x03EF;
pub const MAROON: u16 = 0x7800;
pub const PURPLE: u16 = 0x780F;
pub const OLIVE: u16 = 0x7BE0;
pub const LIGHTGREY: u16 = 0xC618;
pub const DARKGREY: u16 = 0x7BEF;
pub const BLUE: u16 = 0x001F;
pub const GREEN: u16 = 0x07E0;
pub const CYAN: u16 = 0x07FF;
pub const RED: u16 = 0xF800;
pub const MAGENTA: u16 = 0xF81F;
pub const YELLOW: u16 = 0xFFE0;
pub const WHITE: u16 = 0xFFFF;
pub const ORANGE: u16 = 0xFD20;
pub const GREENYELLOW: u16 = 0xAFE5;
pub const PINK: u16 = 0xF81F;

/// Channel lanes of a prexpanded color: `00000GGGGGG00000RRRRR000000BBBBB`
const PREXPANDED_MASK: u32 = 0x07E0_F81F;

// =============================================================================
// RGB565 / RGB888
// =============================================================================

/// Pack 8-bit channels into RGB565
#[inline]
pub const fn color565(r: u8, g: u8, b: u8) -> u16 {
    (((r as u16) & 0xF8) << 8) | (((g as u16) & 0xFC) << 3) | ((b as u16) >> 3)
}

/// Unpack RGB565 into 8-bit channels (low bits zero)
#[inline]
pub const fn color565_to_rgb(color: u16) -> (u8, u8, u8) {
    (
        ((color >> 8) & 0xF8) as u8,
        ((color >> 3) & 0xFC) as u8,
        ((color << 3) & 0xF8) as u8,
    )
}

/// Expand RGB565 to `0xFFRRGGBB`
///
/// Nonzero channels get their low bits filled so full intensity maps to 0xFF.
#[inline]
pub const fn color565_to_888(color: u16) -> u32 {
    let (mut r, mut g, mut b) = color565_to_rgb(color);
    if r != 0 {
        r |= 0x07;
    }
    if g != 0 {
        g |= 0x03;
    }
    if b != 0 {
        b |= 0x07;
    }
    0xFF00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Quantize `0x??RRGGBB` to RGB565
#[inline]
pub const fn color888_to_565(color: u32) -> u16 {
    color565((color >> 16) as u8, (color >> 8) as u8, color as u8)
}

// =============================================================================
// RGB14 (gradient interpolation)
// =============================================================================

/// Color with 14 bits per channel (top bits of each `i16`), used to interpolate
/// gradients without losing the fraction between 565 levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb14 {
    pub r: i16,
    pub g: i16,
    pub b: i16,
}

impl Rgb14 {
    pub const fn from_565(color: u16) -> Self {
        let c = color as u32;
        Self {
            r: ((c >> 2) & 0x3E00) as i16,
            g: ((c << 3) & 0x3F00) as i16,
            b: ((c << 9) & 0x3E00) as i16,
        }
    }

    pub const fn to_565(self) -> u16 {
        let r = (self.r as u16 & 0x3E00) << 2;
        let g = (self.g as u16 & 0x3F00) >> 3;
        let b = (self.b as u16 & 0x3E00) >> 9;
        r | g | b
    }

    /// Point `i` of `n` on the line from `self` to `to` (`i == n` gives `to`)
    pub fn lerp(self, to: Rgb14, i: i32, n: i32) -> Rgb14 {
        if n <= 0 {
            return self;
        }
        let channel = |a: i16, b: i16| (a as i64 + (b as i64 - a as i64) * i as i64 / n as i64) as i16;
        Rgb14 {
            r: channel(self.r, to.r),
            g: channel(self.g, to.g),
            b: channel(self.b, to.b),
        }
    }
}

// =============================================================================
// Prexpanded blending
// =============================================================================

/// Spread a 565 color over 32 bits so each channel has headroom for a
/// 5-bit multiply
#[inline]
pub const fn prexpand(color: u16) -> u32 {
    let c = color as u32;
    (c | (c << 16)) & PREXPANDED_MASK
}

/// Blend two prexpanded colors, `alpha` in 0..=31 (0 = background)
#[inline]
pub const fn blend_prexpanded(fg: u32, bg: u32, alpha: u8) -> u16 {
    let result = ((fg.wrapping_sub(bg).wrapping_mul(alpha as u32) >> 5).wrapping_add(bg))
        & PREXPANDED_MASK;
    ((result >> 16) | result) as u16
}

// =============================================================================
// embedded-graphics interop
// =============================================================================

#[inline]
pub fn to_rgb565(color: u16) -> Rgb565 {
    Rgb565::from(RawU16::new(color))
}

#[inline]
pub fn from_rgb565(color: Rgb565) -> u16 {
    color.into_storage()
}

#[inline]
pub fn from_rgb888(color: Rgb888) -> u16 {
    color565(color.r(), color.g(), color.b())
}

#[inline]
pub fn to_rgb888(color: u16) -> Rgb888 {
    let c = color565_to_888(color);
    Rgb888::new((c >> 16) as u8, (c >> 8) as u8, c as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color565_packing() {
        assert_eq!(color565(255, 255, 255), WHITE);
        assert_eq!(color565(255, 0, 0), RED);
        assert_eq!(color565(0, 255, 0), GREEN);
        assert_eq!(color565(0, 0, 255), BLUE);
        assert_eq!(color565_to_rgb(RED), (0xF8, 0, 0));
    }

    #[test]
    fn test_565_888_round_trip_all_values() {
        for c in 0..=u16::MAX {
            assert_eq!(color888_to_565(color565_to_888(c)), c);
        }
    }

    #[test]
    fn test_888_expansion_fills_low_bits() {
        assert_eq!(color565_to_888(WHITE), 0xFFFF_FFFF);
        assert_eq!(color565_to_888(BLACK), 0xFF00_0000);
        assert_eq!(color565_to_888(RED), 0xFFFF_0000);
    }

    #[test]
    fn test_rgb14_round_trip() {
        for c in [BLACK, WHITE, RED, GREEN, BLUE, ORANGE, 0x1234, 0xABCD] {
            assert_eq!(Rgb14::from_565(c).to_565(), c);
        }
    }

    #[test]
    fn test_rgb14_lerp() {
        let from = Rgb14::from_565(BLACK);
        let to = Rgb14::from_565(WHITE);
        assert_eq!(from.lerp(to, 0, 10), from);
        assert_eq!(from.lerp(to, 10, 10).to_565(), WHITE);
        assert_eq!(from.lerp(to, 1, 2).r, 0x3E00 / 2);
        assert_eq!(from.lerp(to, 3, 0), from);
    }

    #[test]
    fn test_rgb14_lerp_long_ramp() {
        let from = Rgb14::from_565(BLACK);
        let to = Rgb14::from_565(WHITE);
        assert_eq!(from.lerp(to, i32::MAX, i32::MAX).to_565(), WHITE);
        assert_eq!(from.lerp(to, 300_000, 600_000).r, 0x3E00 / 2);
        assert_eq!(to.lerp(from, i32::MAX - 1, i32::MAX).to_565(), BLACK);
    }

    #[test]
    fn test_blend_endpoints() {
        let fg = prexpand(WHITE);
        let bg = prexpand(NAVY);
        assert_eq!(blend_prexpanded(fg, bg, 0), NAVY);
        assert_eq!(blend_prexpanded(bg, bg, 17), NAVY);
        assert_eq!(prexpand(WHITE), 0x07E0_F81F);
    }

    #[test]
    fn test_blend_midpoint_is_between() {
        let mid = blend_prexpanded(prexpand(WHITE), prexpand(BLACK), 16);
        let (r, g, b) = color565_to_rgb(mid);
        assert!(r > 0x40 && r < 0xC0);
        assert!(g > 0x40 && g < 0xC0);
        assert!(b > 0x40 && b < 0xC0);
    }

    #[test]
    fn test_embedded_graphics_conversion() {
        assert_eq!(from_rgb565(to_rgb565(0xBEEF)), 0xBEEF);
        assert_eq!(from_rgb888(Rgb888::new(255, 0, 0)), RED);
        assert_eq!(to_rgb888(WHITE), Rgb888::new(255, 255, 255));
    }
}
