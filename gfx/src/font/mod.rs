//! Font assets
//!
//! Four kinds of font can be selected on a canvas: the built-in 5x7 table,
//! a user table in the same fixed-cell layout, packed bitstream fonts
//! (1bpp or anti-aliased) and Adafruit GFX fonts.

pub mod bits;
pub mod gfx;
pub mod glcd;
pub mod packed;

pub use bits::BitReader;
pub use gfx::{GfxFont, GfxGlyph};
pub use glcd::{FixedFont, GLCD};
pub use packed::{Glyph, PackedFont};

/// Active font
#[derive(Debug, Clone, Copy, Default)]
pub enum Font {
    /// Built-in 5x7 table
    #[default]
    Builtin,
    /// Fixed-cell table replacing the built-in one
    Fixed(&'static FixedFont),
    Packed(&'static PackedFont),
    Gfx(&'static GfxFont),
}

impl Font {
    /// Fixed-cell table, for the builtin and fixed variants
    pub fn fixed_table(&self) -> Option<&'static FixedFont> {
        match *self {
            Font::Builtin => Some(&GLCD),
            Font::Fixed(table) => Some(table),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Font::Builtin => "builtin",
            Font::Fixed(_) => "fixed",
            Font::Packed(font) if font.is_anti_aliased() => "packed (anti-aliased)",
            Font::Packed(_) => "packed",
            Font::Gfx(_) => "gfx",
        }
    }

    pub fn is_gfx(&self) -> bool {
        matches!(self, Font::Gfx(_))
    }

    pub fn is_anti_aliased(&self) -> bool {
        matches!(self, Font::Packed(font) if font.is_anti_aliased())
    }

    /// Same font asset
    pub fn same_as(&self, other: &Font) -> bool {
        match (self, other) {
            (Font::Builtin, Font::Builtin) => true,
            (Font::Fixed(a), Font::Fixed(b)) => core::ptr::eq(*a, *b),
            (Font::Packed(a), Font::Packed(b)) => core::ptr::eq(*a, *b),
            (Font::Gfx(a), Font::Gfx(b)) => core::ptr::eq(*a, *b),
            _ => false,
        }
    }
}
