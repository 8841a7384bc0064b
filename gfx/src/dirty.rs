//! Dirty rectangle tracking
//!
//! Bounding box of every shadow-buffer pixel changed since the last flush.
//! Bounds are inclusive; the empty state has `max < min`.

const EMPTY_MIN: i32 = 0x7FFF;
const EMPTY_MAX: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl Default for DirtyRect {
    fn default() -> Self {
        Self::new()
    }
}

impl DirtyRect {
    pub const fn new() -> Self {
        Self {
            min_x: EMPTY_MIN,
            min_y: EMPTY_MIN,
            max_x: EMPTY_MAX,
            max_y: EMPTY_MAX,
        }
    }

    /// Forget everything (after a flush)
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max_x < self.min_x || self.max_y < self.min_y
    }

    /// Grow to cover a single point
    #[inline]
    pub fn include_point(&mut self, x: i32, y: i32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Grow to cover a `w x h` rectangle at `(x, y)`
    #[inline]
    pub fn include(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if w <= 0 || h <= 0 {
            return;
        }
        self.include_point(x, y);
        self.include_point(x + w - 1, y + h - 1);
    }

    /// Inclusive `(x1, y1, x2, y2)`, or `None` when nothing changed
    pub fn bounds(&self) -> Option<(i32, i32, i32, i32)> {
        (!self.is_empty()).then_some((self.min_x, self.min_y, self.max_x, self.max_y))
    }

    /// Intersect with an exclusive `(x1, y1, x2, y2)` box; inclusive result
    pub fn clipped(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> Option<(i32, i32, i32, i32)> {
        let (mx1, my1, mx2, my2) = self.bounds()?;
        let cx1 = mx1.max(x1);
        let cy1 = my1.max(y1);
        let cx2 = mx2.min(x2 - 1);
        let cy2 = my2.min(y2 - 1);
        (cx1 <= cx2 && cy1 <= cy2).then_some((cx1, cy1, cx2, cy2))
    }
}
