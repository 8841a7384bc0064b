//! Backend dispatch
//!
//! Every clipped write ends up here and goes either straight to the sink or
//! into the shadow mirror. Windows are in display coordinates and already
//! clipped.

use alloc::vec;

use crate::clip::Window;
use crate::color::color888_to_565;
use crate::mirror::FrameMirror;
use crate::sink::DisplaySink;

pub(crate) enum Surface<'a, S: DisplaySink> {
    Direct(&'a mut S),
    Mirror(&'a mut FrameMirror),
}

impl<S: DisplaySink> Surface<'_, S> {
    pub fn fill(&mut self, win: &Window, color: u16) {
        match self {
            Surface::Direct(sink) => {
                sink.fill_rect(win.x as u16, win.y as u16, win.w as u16, win.h as u16, color)
            }
            Surface::Mirror(mirror) => mirror.fill(win, color),
        }
    }

    pub fn fill_888(&mut self, win: &Window, color: u32) {
        match self {
            Surface::Direct(sink) => sink.fill_rect(
                win.x as u16,
                win.y as u16,
                win.w as u16,
                win.h as u16,
                color888_to_565(color),
            ),
            Surface::Mirror(mirror) => mirror.fill_888(win, color),
        }
    }

    /// `src[r * stride + c]` lands on `(win.x + c, win.y + r)`
    ///
    /// Only the rows `src` fully covers are written.
    pub fn write(&mut self, win: &Window, src: &[u16], stride: usize) {
        let Some(win) = covered_rows(win, src.len(), stride) else {
            return;
        };
        let win = &win;
        match self {
            Surface::Direct(sink) => {
                if stride == win.w as usize && src.len() >= win.area() {
                    sink.write_rect(win.x as u16, win.y as u16, win.w as u16, win.h as u16, src);
                } else {
                    stream(&mut **sink, win, |c, r| src.get(r * stride + c).copied().unwrap_or(0));
                }
            }
            Surface::Mirror(mirror) => mirror.write_565(win, src, stride),
        }
    }

    pub fn write_888(&mut self, win: &Window, src: &[u32], stride: usize) {
        let Some(win) = covered_rows(win, src.len(), stride) else {
            return;
        };
        let win = &win;
        match self {
            Surface::Direct(sink) => stream(&mut **sink, win, |c, r| {
                src.get(r * stride + c).map(|&p| color888_to_565(p)).unwrap_or(0)
            }),
            Surface::Mirror(mirror) => mirror.write_888(win, src, stride),
        }
    }

    /// Set each pixel from a function of display coordinates
    pub fn paint(&mut self, win: &Window, mut color_at: impl FnMut(i32, i32) -> u16) {
        match self {
            Surface::Direct(sink) => {
                stream(&mut **sink, win, |c, r| color_at(win.x + c as i32, win.y + r as i32))
            }
            Surface::Mirror(mirror) => mirror.paint(win, color_at),
        }
    }

    /// Read back a window into `out[r * stride + c]`
    pub fn read(&mut self, win: &Window, out: &mut [u16], stride: usize) {
        match self {
            Surface::Direct(sink) => {
                let (x, y, w, h) = (win.x as u16, win.y as u16, win.w as u16, win.h as u16);
                if stride == win.w as usize && out.len() >= win.area() {
                    sink.read_rect(x, y, w, h, out);
                    return;
                }
                let mut rows = vec![0u16; win.area()];
                sink.read_rect(x, y, w, h, &mut rows);
                for (r, row) in rows.chunks(win.w as usize).enumerate() {
                    let base = r * stride;
                    if let Some(dst) = out.get_mut(base..base + row.len()) {
                        dst.copy_from_slice(row);
                    }
                }
            }
            Surface::Mirror(mirror) => mirror.read(win, out, stride),
        }
    }
}

/// Shrink `win` to the rows a source of `len` pixels with `stride` fills completely
fn covered_rows(win: &Window, len: usize, stride: usize) -> Option<Window> {
    let w = win.w as usize;
    if len < w {
        return None;
    }
    let rows = match stride {
        0 => win.h,
        _ => ((len - w) / stride + 1).min(win.h as usize) as i32,
    };
    Some(Window { h: rows, ..*win })
}

/// One address window, pixels generated row-major by `(col, row)`
fn stream<S: DisplaySink>(sink: &mut S, win: &Window, mut color_at: impl FnMut(usize, usize) -> u16) {
    sink.set_addr(
        win.x as u16,
        win.y as u16,
        (win.right() - 1) as u16,
        (win.bottom() - 1) as u16,
    );
    sink.begin_write();
    for r in 0..win.h as usize {
        for c in 0..win.w as usize {
            sink.write_color(color_at(c, r));
        }
    }
    sink.end_write();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(x: i32, y: i32, w: i32, h: i32) -> Window {
        Window { x, y, w, h, skip_rows: 0, skip_left: 0, skip_right: 0 }
    }

    #[test]
    fn test_covered_rows() {
        let win = window(2, 3, 4, 3);
        assert_eq!(covered_rows(&win, 12, 4).map(|w| w.h), Some(3));
        assert_eq!(covered_rows(&win, 7, 4).map(|w| w.h), Some(1));
        assert_eq!(covered_rows(&win, 8, 4).map(|w| w.h), Some(2));
        // wider source image: a row only needs its first w pixels
        assert_eq!(covered_rows(&win, 14, 10).map(|w| w.h), Some(2));
        assert_eq!(covered_rows(&win, 3, 4), None);
        assert_eq!(covered_rows(&win, 100, 4).map(|w| (w.x, w.y, w.w)), Some((2, 3, 4)));
    }
}
