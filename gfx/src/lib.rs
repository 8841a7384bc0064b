//! Raster graphics core for parallel-bus TFT panels
//!
//! A [`Canvas`] draws RGB565 primitives, bitmaps and text onto a
//! [`DisplaySink`], either streaming each clipped window straight to the
//! panel or into an optional shadow frame buffer that is flushed on demand.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod bitmap;
mod buffer;
mod canvas;
mod clip;
pub mod color;
pub mod config;
mod dirty;
mod error;
pub mod font;
mod mirror;
mod shapes;
mod sink;
mod surface;
mod text;

pub use buffer::{PixelBuffer, PixelWord};
pub use canvas::Canvas;
pub use clip::{ClipRegion, Window};
pub use config::{CanvasConfig, ColorDepth, CENTER};
pub use dirty::DirtyRect;
pub use error::FrameBufferError;
pub use font::{FixedFont, Font, GfxFont, GfxGlyph, PackedFont};
pub use mirror::{FrameMirror, FrameStore};
pub use shapes::{Corners, Halves};
pub use sink::{DisplaySink, MemoryPanel, PanelStats};
pub use text::{Datum, ScrollArea};
