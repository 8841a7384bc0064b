//! Clip and coordinate engine
//!
//! Logical coordinates are translated by the origin, then intersected with
//! the display clip: the user clip rectangle (relative to the origin)
//! clamped to the canvas. Right and bottom bounds are exclusive.
//!
//! Every write primitive goes through [`ClipRegion::clip_rect`], which also
//! reports how much of the source rectangle was cut off on each side so
//! pixel arrays stay in step with their stride.

/// Visible part of a rectangle, in display coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    /// Source rows hidden above the window
    pub skip_rows: i32,
    /// Source columns hidden left of the window
    pub skip_left: i32,
    /// Source columns hidden right of the window
    pub skip_right: i32,
}

impl Window {
    /// Exclusive right edge
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Number of pixels covered
    pub fn area(&self) -> usize {
        self.w as usize * self.h as usize
    }

    /// Index of the first visible pixel in a row-major source with `stride`
    pub fn source_offset(&self, stride: usize) -> usize {
        self.skip_rows as usize * stride + self.skip_left as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRegion {
    width: i32,
    height: i32,
    origin_x: i32,
    origin_y: i32,
    // User clip, relative to the origin
    clip_x1: i32,
    clip_y1: i32,
    clip_x2: i32,
    clip_y2: i32,
    // Derived display clip, absolute
    display_x1: i32,
    display_y1: i32,
    display_x2: i32,
    display_y2: i32,
    invisible: bool,
    standard: bool,
}

impl ClipRegion {
    /// Full-screen clip with a zero origin
    pub fn new(width: i32, height: i32) -> Self {
        let mut region = Self {
            width: width.max(0),
            height: height.max(0),
            origin_x: 0,
            origin_y: 0,
            clip_x1: 0,
            clip_y1: 0,
            clip_x2: width.max(0),
            clip_y2: height.max(0),
            display_x1: 0,
            display_y1: 0,
            display_x2: 0,
            display_y2: 0,
            invisible: true,
            standard: false,
        };
        region.update_display_clip();
        region
    }

    /// Resize the canvas, resetting clip and origin
    pub fn resize(&mut self, width: i32, height: i32) {
        *self = Self::new(width, height);
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn set_origin(&mut self, x: i32, y: i32) {
        self.origin_x = x;
        self.origin_y = y;
        self.update_display_clip();
    }

    pub fn origin(&self) -> (i32, i32) {
        (self.origin_x, self.origin_y)
    }

    /// Set the user clip rectangle, relative to the origin
    pub fn set_clip_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.clip_x1 = x;
        self.clip_y1 = y;
        self.clip_x2 = x.saturating_add(w);
        self.clip_y2 = y.saturating_add(h);
        self.update_display_clip();
    }

    /// Reset the user clip to the whole canvas
    pub fn reset_clip(&mut self) {
        self.clip_x1 = 0;
        self.clip_y1 = 0;
        self.clip_x2 = self.width;
        self.clip_y2 = self.height;
        self.update_display_clip();
    }

    fn update_display_clip(&mut self) {
        let (ox, oy, width, height) = (self.origin_x, self.origin_y, self.width, self.height);
        let clamp_x = |v: i32| v.saturating_add(ox).clamp(0, width);
        let clamp_y = |v: i32| v.saturating_add(oy).clamp(0, height);
        self.display_x1 = clamp_x(self.clip_x1);
        self.display_x2 = clamp_x(self.clip_x2);
        self.display_y1 = clamp_y(self.clip_y1);
        self.display_y2 = clamp_y(self.clip_y2);
        self.invisible = self.display_x1 >= self.display_x2 || self.display_y1 >= self.display_y2;
        self.standard = self.display_x1 == 0
            && self.display_y1 == 0
            && self.display_x2 == self.width
            && self.display_y2 == self.height;
    }

    /// Display clip as `(x1, y1, x2, y2)`, right/bottom exclusive
    pub fn display_clip(&self) -> (i32, i32, i32, i32) {
        (self.display_x1, self.display_y1, self.display_x2, self.display_y2)
    }

    /// Display clip covers the whole canvas
    pub fn is_standard(&self) -> bool {
        self.standard
    }

    /// Display clip is empty
    pub fn is_invisible(&self) -> bool {
        self.invisible
    }

    /// Display-coordinate point inside the display clip
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.display_x1 && x < self.display_x2 && y >= self.display_y1 && y < self.display_y2
    }

    /// Translate a logical point and test it against the clip
    #[inline]
    pub fn clip_point(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        let x = x.saturating_add(self.origin_x);
        let y = y.saturating_add(self.origin_y);
        self.contains(x, y).then_some((x, y))
    }

    /// Translate and clip a logical rectangle
    ///
    /// Returns `None` for non-positive sizes and fully hidden rectangles.
    pub fn clip_rect(&self, x: i32, y: i32, w: i32, h: i32) -> Option<Window> {
        self.clip_display_rect(x.saturating_add(self.origin_x), y.saturating_add(self.origin_y), w, h)
    }

    /// Clip a rectangle already in display coordinates
    pub fn clip_display_rect(&self, x: i32, y: i32, w: i32, h: i32) -> Option<Window> {
        if w <= 0 || h <= 0 {
            return None;
        }
        let x2 = x.saturating_add(w);
        let y2 = y.saturating_add(h);
        if x >= self.display_x2 || y >= self.display_y2 || x2 <= self.display_x1 || y2 <= self.display_y1 {
            return None;
        }

        let vx1 = x.max(self.display_x1);
        let vy1 = y.max(self.display_y1);
        let vx2 = x2.min(self.display_x2);
        let vy2 = y2.min(self.display_y2);

        Some(Window {
            x: vx1,
            y: vy1,
            w: vx2 - vx1,
            h: vy2 - vy1,
            skip_rows: vy1 - y,
            skip_left: vx1 - x,
            skip_right: x2 - vx2,
        })
    }

    /// Horizontal line; returns display `(x, y, w)`
    pub fn clip_hline(&self, x: i32, y: i32, w: i32) -> Option<(i32, i32, i32)> {
        self.clip_rect(x, y, w, 1).map(|win| (win.x, win.y, win.w))
    }

    /// Vertical line; returns display `(x, y, h)`
    pub fn clip_vline(&self, x: i32, y: i32, h: i32) -> Option<(i32, i32, i32)> {
        self.clip_rect(x, y, 1, h).map(|win| (win.x, win.y, win.h))
    }
}
