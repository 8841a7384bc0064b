//! Scroll area
//!
//! Text written inside the area scrolls its content up instead of running
//! off the bottom. Scrolling copies rows through read-back, so it works the
//! same on the panel and in the frame buffer.

use alloc::vec;

use crate::canvas::Canvas;
use crate::sink::DisplaySink;

/// Region whose content scrolls up when text reaches its bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollArea {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl ScrollArea {
    pub(super) fn holds(&self, x: i32, y: i32) -> bool {
        x >= self.x && x <= self.x + self.w && y >= self.y && y <= self.y + self.h
    }
}

impl<S: DisplaySink> Canvas<S> {
    pub fn set_scroll_text_area(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.text.scroll = ScrollArea { x, y, w, h };
    }

    pub fn scroll_area(&self) -> ScrollArea {
        self.text.scroll
    }

    /// Set the color revealed by scrolling and clear the area with it
    pub fn set_scroll_background_color(&mut self, color: u16) {
        self.text.scroll_bg = color;
        let ScrollArea { x, y, w, h } = self.text.scroll;
        self.fill_rect(x, y, w, h, color);
    }

    /// Set the color revealed by scrolling without clearing
    pub fn reset_scroll_background_color(&mut self, color: u16) {
        self.text.scroll_bg = color;
    }

    pub fn enable_scroll(&mut self) {
        self.text.scroll_enabled = true;
    }

    pub fn disable_scroll(&mut self) {
        self.text.scroll_enabled = false;
    }

    /// Move the scroll area content up by `lines` rows
    pub fn scroll_text_area(&mut self, lines: i32) {
        let ScrollArea { x, y, w, h } = self.text.scroll;
        if w <= 0 || h <= 0 || lines <= 0 {
            return;
        }
        log::trace!("scroll text area by {}", lines);
        let mut row = vec![0u16; w as usize];
        for line in y + lines..y + h {
            self.read_rect(x, line, w, 1, &mut row);
            self.write_rect(x, line - lines, w, 1, &row);
        }
        let lines = lines.min(h);
        self.fill_rect(x, y + h - lines, w, lines, self.text.scroll_bg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLACK, BLUE, WHITE};
    use crate::text::tests::canvas;

    #[test]
    fn test_scroll_area_moves_lines_up() {
        let mut c = canvas(12, 24);
        c.set_scroll_text_area(0, 0, 12, 16);
        c.set_scroll_background_color(BLUE);
        assert_eq!(c.sink().pixel(11, 15), BLUE);
        assert_eq!(c.sink().pixel(0, 16), 0);

        c.enable_scroll();
        c.set_cursor(0, 0);
        c.set_text_color_bg(WHITE, BLACK);
        c.print("A\nB\nC");

        // 'B' scrolled to the top, 'C' below it
        assert_eq!(c.sink().pixel(0, 0), WHITE);
        assert_eq!(c.sink().pixel(0, 7), BLACK);
        assert_eq!(c.sink().pixel(0, 8), BLACK);
        assert_eq!(c.sink().pixel(0, 9), WHITE);
        assert_eq!(c.sink().pixel(7, 8), BLUE);
        assert_eq!(c.sink().pixel(0, 16), 0);
        assert_eq!(c.cursor(), (6, 8));
    }

    #[test]
    fn test_scroll_disabled_keeps_content() {
        let mut c = canvas(12, 24);
        c.set_scroll_text_area(0, 0, 12, 16);
        c.set_cursor(0, 16);
        c.print("A");
        c.disable_scroll();
        c.scroll_text_area(0);
        assert_eq!(c.sink().pixel(0, 18), WHITE);
        assert_eq!(c.cursor(), (6, 16));
    }
}
