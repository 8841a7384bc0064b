//! Pixel buffer backend
//!
//! A row-major `width x height` pixel store, either allocated here (32-byte
//! aligned, zeroed) or borrowed from the caller for the lifetime of the
//! program. All row access goes through [`PixelBuffer::span_mut`] so the
//! stride arithmetic lives in exactly one place.

use alloc::alloc::{alloc_zeroed, dealloc, Layout};
use core::ptr::NonNull;

use crate::clip::Window;
use crate::color::{color565_to_888, color888_to_565};
use crate::config::FRAME_BUFFER_ALIGN;
use crate::error::FrameBufferError;

/// Storage word of a frame buffer pixel
pub trait PixelWord: Copy + PartialEq + Default + 'static {
    fn from_565(color: u16) -> Self;
    fn to_565(self) -> u16;
}

impl PixelWord for u16 {
    #[inline(always)]
    fn from_565(color: u16) -> Self {
        color
    }

    #[inline(always)]
    fn to_565(self) -> u16 {
        self
    }
}

impl PixelWord for u32 {
    #[inline(always)]
    fn from_565(color: u16) -> Self {
        color565_to_888(color)
    }

    #[inline(always)]
    fn to_565(self) -> u16 {
        color888_to_565(self)
    }
}

// =============================================================================
// Aligned heap allocation
// =============================================================================

struct AlignedPixels<P> {
    ptr: NonNull<P>,
    len: usize,
    layout: Layout,
}

impl<P: PixelWord> AlignedPixels<P> {
    fn zeroed(len: usize) -> Option<Self> {
        let size = len.checked_mul(core::mem::size_of::<P>())?;
        if size == 0 {
            return None;
        }
        let layout = Layout::from_size_align(size, FRAME_BUFFER_ALIGN).ok()?;
        // SAFETY: layout has a nonzero size; all-zero bits are a valid u16/u32
        let raw = unsafe { alloc_zeroed(layout) } as *mut P;
        NonNull::new(raw).map(|ptr| Self { ptr, len, layout })
    }

    fn as_slice(&self) -> &[P] {
        // SAFETY: ptr is a live allocation of len initialized elements
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    fn as_mut_slice(&mut self) -> &mut [P] {
        // SAFETY: as above, and &mut self guarantees exclusive access
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<P> Drop for AlignedPixels<P> {
    fn drop(&mut self) {
        // SAFETY: ptr/layout come from the matching alloc_zeroed call
        unsafe { dealloc(self.ptr.as_ptr() as *mut u8, self.layout) }
    }
}

enum Storage<P: 'static> {
    Owned(AlignedPixels<P>),
    External(&'static mut [P]),
}

impl<P: PixelWord> Storage<P> {
    fn as_slice(&self) -> &[P] {
        match self {
            Storage::Owned(pixels) => pixels.as_slice(),
            Storage::External(pixels) => pixels,
        }
    }

    fn as_mut_slice(&mut self) -> &mut [P] {
        match self {
            Storage::Owned(pixels) => pixels.as_mut_slice(),
            Storage::External(pixels) => pixels,
        }
    }
}

// =============================================================================
// PixelBuffer
// =============================================================================

pub struct PixelBuffer<P: PixelWord> {
    storage: Storage<P>,
    width: usize,
    height: usize,
}

impl<P: PixelWord> PixelBuffer<P> {
    /// Allocate a zeroed, 32-byte aligned buffer
    pub fn allocate(width: usize, height: usize) -> Result<Self, FrameBufferError> {
        let len = width.checked_mul(height).ok_or(FrameBufferError::AllocationFailed)?;
        let pixels = AlignedPixels::zeroed(len).ok_or(FrameBufferError::AllocationFailed)?;
        Ok(Self {
            storage: Storage::Owned(pixels),
            width,
            height,
        })
    }

    /// Wrap caller-owned storage; contents are left as they are
    pub fn from_static(pixels: &'static mut [P], width: usize, height: usize) -> Result<Self, FrameBufferError> {
        match width.checked_mul(height) {
            Some(len) if len <= pixels.len() => Ok(Self {
                storage: Storage::External(pixels),
                width,
                height,
            }),
            _ => Err(FrameBufferError::BufferTooSmall),
        }
    }

    /// Storage was allocated by this buffer
    pub fn is_owned(&self) -> bool {
        matches!(self.storage, Storage::Owned(_))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reinterpret the same pixels with new dimensions (rotation)
    pub fn reshape(&mut self, width: usize, height: usize) -> bool {
        if width.checked_mul(height) != Some(self.width * self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    /// All pixels, row-major
    pub fn pixels(&self) -> &[P] {
        let len = self.width * self.height;
        &self.storage.as_slice()[..len]
    }

    pub fn as_ptr(&self) -> *const P {
        self.storage.as_slice().as_ptr()
    }

    #[inline(always)]
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// `w` pixels starting at `(x, y)`, if the run stays inside its row
    #[inline]
    pub fn span(&self, x: i32, y: i32, w: i32) -> Option<&[P]> {
        let start = self.offset(x, y)?;
        if w < 0 || x as usize + w as usize > self.width {
            return None;
        }
        self.storage.as_slice().get(start..start + w as usize)
    }

    /// Mutable counterpart of [`PixelBuffer::span`]
    #[inline]
    pub fn span_mut(&mut self, x: i32, y: i32, w: i32) -> Option<&mut [P]> {
        let start = self.offset(x, y)?;
        if w < 0 || x as usize + w as usize > self.width {
            return None;
        }
        self.storage.as_mut_slice().get_mut(start..start + w as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<P> {
        self.span(x, y, 1).map(|px| px[0])
    }

    pub fn set(&mut self, x: i32, y: i32, value: P) {
        if let Some(px) = self.span_mut(x, y, 1) {
            px[0] = value;
        }
    }

    /// Fill a window with one value
    pub fn fill(&mut self, win: &Window, value: P) {
        for y in win.y..win.bottom() {
            if let Some(row) = self.span_mut(win.x, y, win.w) {
                row.fill(value);
            }
        }
    }

    /// Copy `src` into a window; `src[r * stride + c]` lands on `(win.x + c, win.y + r)`
    ///
    /// Pixels that already hold the value are left untouched. Stops early
    /// when `src` runs out.
    pub fn write_from<Q: Copy>(&mut self, win: &Window, src: &[Q], stride: usize, convert: impl Fn(Q) -> P) {
        for r in 0..win.h {
            let base = r as usize * stride;
            let Some(src_row) = src.get(base..base + win.w as usize) else {
                return;
            };
            if let Some(row) = self.span_mut(win.x, win.y + r, win.w) {
                for (dst, &s) in row.iter_mut().zip(src_row) {
                    let value = convert(s);
                    if *dst != value {
                        *dst = value;
                    }
                }
            }
        }
    }

    /// Set every pixel of a window from a function of display coordinates
    pub fn paint(&mut self, win: &Window, mut color_at: impl FnMut(i32, i32) -> P) {
        for y in win.y..win.bottom() {
            if let Some(row) = self.span_mut(win.x, y, win.w) {
                for (i, dst) in row.iter_mut().enumerate() {
                    *dst = color_at(win.x + i as i32, y);
                }
            }
        }
    }

    /// Copy a window out; `out[r * stride + c]` receives `(win.x + c, win.y + r)`
    pub fn read_into<Q>(&self, win: &Window, out: &mut [Q], stride: usize, convert: impl Fn(P) -> Q) {
        for r in 0..win.h {
            let base = r as usize * stride;
            let Some(out_row) = out.get_mut(base..base + win.w as usize) else {
                return;
            };
            if let Some(row) = self.span(win.x, win.y + r, win.w) {
                for (dst, &s) in out_row.iter_mut().zip(row) {
                    *dst = convert(s);
                }
            }
        }
    }
}
