//! Packed bitstream fonts (ILI9341_t3 layout)
//!
//! Each glyph is a bit-packed header followed by its bitmap. 1bpp glyphs
//! compress repeated rows: a row starts with one flag bit, `1` means a
//! 3-bit count follows and the row is used `count + 2` times. Anti-aliased
//! glyphs (format version 23) store `bpp` bits per pixel after a byte
//! alignment.

use alloc::vec;
use alloc::vec::Vec;

use super::bits::BitReader;

/// Font header and tables
#[derive(Debug, Clone, Copy)]
pub struct PackedFont {
    /// `bits_index`-wide byte offsets into `data`, one per code
    pub index: &'static [u8],
    pub data: &'static [u8],
    pub version: u8,
    /// Low two bits carry `bpp - 1` when `version == 23`
    pub reserved: u8,
    pub index1_first: u8,
    pub index1_last: u8,
    pub index2_first: u8,
    pub index2_last: u8,
    pub bits_index: u8,
    pub bits_width: u8,
    pub bits_height: u8,
    pub bits_xoffset: u8,
    pub bits_yoffset: u8,
    pub bits_delta: u8,
    pub line_space: u8,
    pub cap_height: u8,
}

/// Decoded glyph header with a handle on its bitmap
#[derive(Debug, Clone)]
pub struct Glyph {
    pub width: u32,
    pub height: u32,
    pub xoffset: i32,
    pub yoffset: i32,
    /// Horizontal advance
    pub delta: u32,
    data: &'static [u8],
    bitmap_pos: usize,
    bpp: u8,
}

/// Version tag of the anti-aliased format
pub const ANTI_ALIASED_VERSION: u8 = 23;

impl PackedFont {
    pub fn bits_per_pixel(&self) -> u8 {
        if self.version == ANTI_ALIASED_VERSION {
            (self.reserved & 0b11) + 1
        } else {
            1
        }
    }

    pub fn is_anti_aliased(&self) -> bool {
        self.bits_per_pixel() > 1
    }

    /// Highest coverage value a pixel can carry
    pub fn max_coverage(&self) -> u8 {
        ((1u16 << self.bits_per_pixel()) - 1) as u8
    }

    /// Multiplier taking a coverage value to the 0..=31 blend scale
    pub fn alpha_scale(&self) -> u8 {
        31 / self.max_coverage()
    }

    fn slot(&self, c: u32) -> Option<u32> {
        let (first1, last1) = (self.index1_first as u32, self.index1_last as u32);
        let (first2, last2) = (self.index2_first as u32, self.index2_last as u32);
        if (first1..=last1).contains(&c) {
            Some(c - first1)
        } else if (first2..=last2).contains(&c) {
            Some(c - first2 + (last1 + 1).saturating_sub(first1))
        } else {
            None
        }
    }

    /// Look up and decode the header of `c`
    ///
    /// `None` for codes outside both index ranges and for glyphs in an
    /// encoding other than 0.
    pub fn glyph(&self, c: u32) -> Option<Glyph> {
        let slot = self.slot(c)?;
        let offset = BitReader::at(self.index, slot as usize * self.bits_index as usize)
            .read_unsigned(self.bits_index) as usize;
        let data = self.data.get(offset..)?;

        let mut reader = BitReader::new(data);
        if reader.read_unsigned(3) != 0 {
            return None;
        }
        let width = reader.read_unsigned(self.bits_width);
        let height = reader.read_unsigned(self.bits_height);
        let xoffset = reader.read_signed(self.bits_xoffset);
        let yoffset = reader.read_signed(self.bits_yoffset);
        let delta = reader.read_unsigned(self.bits_delta);

        Some(Glyph {
            width,
            height,
            xoffset,
            yoffset,
            delta,
            data,
            bitmap_pos: reader.position(),
            bpp: self.bits_per_pixel(),
        })
    }
}

impl Glyph {
    /// Row-major coverage, `width * height` values
    ///
    /// 1bpp glyphs give 0 or 1, anti-aliased glyphs give `0..=max_coverage`.
    pub fn coverage(&self) -> Vec<u8> {
        let (width, height) = (self.width as usize, self.height as usize);
        let mut out = vec![0u8; width * height];
        let mut reader = BitReader::at(self.data, self.bitmap_pos);

        if self.bpp > 1 {
            reader.align_byte();
            for value in out.iter_mut() {
                *value = reader.read_unsigned(self.bpp) as u8;
            }
            return out;
        }

        let mut row = 0;
        while row < height {
            let repeat = if reader.read_bit() == 0 {
                1
            } else {
                reader.read_unsigned(3) as usize + 2
            };
            let start = row * width;
            for value in &mut out[start..start + width] {
                *value = reader.read_bit() as u8;
            }
            let copies = repeat.min(height - row);
            for extra in 1..copies {
                out.copy_within(start..start + width, start + extra * width);
            }
            row += copies;
        }
        out
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::font::bits::tests::BitWriter;
    use alloc::boxed::Box;

    /// Test glyph: code, xoffset, yoffset, delta, rows
    ///
    /// Rows use `#` for full coverage, `.` for none and digits for
    /// intermediate levels.
    pub(crate) type TestGlyph<'a> = (char, i32, i32, u32, &'a [&'a str]);

    fn level(ch: char, max: u32) -> u32 {
        match ch {
            '#' => max,
            '.' => 0,
            d => d.to_digit(10).unwrap_or(0).min(max),
        }
    }

    /// Build a leaked font; glyph codes must be consecutive
    pub(crate) fn build_font(
        bpp: u8,
        cap_height: u8,
        line_space: u8,
        glyphs: &[TestGlyph<'_>],
    ) -> &'static PackedFont {
        let max = (1u32 << bpp) - 1;
        let mut data = BitWriter::default();
        let mut index = BitWriter::default();

        for &(_, xoffset, yoffset, delta, rows) in glyphs {
            data.align();
            index.push((data.bit_len() / 8) as u32, 16);

            let width = rows.first().map_or(0, |r| r.len()) as u32;
            data.push(0, 3);
            data.push(width, 6);
            data.push(rows.len() as u32, 6);
            data.push_signed(xoffset, 5);
            data.push_signed(yoffset, 5);
            data.push(delta, 6);

            if bpp > 1 {
                data.align();
                for row in rows {
                    for ch in row.chars() {
                        data.push(level(ch, max), bpp);
                    }
                }
                continue;
            }
            let mut i = 0;
            while i < rows.len() {
                let mut n = 1;
                while i + n < rows.len() && rows[i + n] == rows[i] && n < 9 {
                    n += 1;
                }
                if n == 1 {
                    data.push(0, 1);
                } else {
                    data.push(1, 1);
                    data.push(n as u32 - 2, 3);
                }
                for ch in rows[i].chars() {
                    data.push(level(ch, 1), 1);
                }
                i += n;
            }
        }

        let first = glyphs.first().map_or(0, |g| g.0 as u8);
        let last = glyphs.last().map_or(0, |g| g.0 as u8);
        Box::leak(Box::new(PackedFont {
            index: index.into_bytes().leak(),
            data: data.into_bytes().leak(),
            version: if bpp > 1 { ANTI_ALIASED_VERSION } else { 0 },
            reserved: bpp.saturating_sub(1) & 0b11,
            index1_first: first,
            index1_last: last,
            index2_first: 1,
            index2_last: 0,
            bits_index: 16,
            bits_width: 6,
            bits_height: 6,
            bits_xoffset: 5,
            bits_yoffset: 5,
            bits_delta: 6,
            line_space,
            cap_height,
        }))
    }

    #[test]
    fn test_glyph_header() {
        let font = build_font(1, 5, 7, &[('a', -1, 2, 4, &["#.", ".#", "##"]), ('b', 0, 0, 3, &["#"])]);
        let g = font.glyph('a' as u32).unwrap();
        assert_eq!((g.width, g.height, g.xoffset, g.yoffset, g.delta), (2, 3, -1, 2, 4));
        let g = font.glyph('b' as u32).unwrap();
        assert_eq!((g.width, g.height, g.delta), (1, 1, 3));
        assert!(font.glyph('c' as u32).is_none());
        assert!(font.glyph(0).is_none());
    }

    #[test]
    fn test_1bpp_row_repeats() {
        let rows: &[&str] = &["#..#", "#..#", "#..#", "####", ".##.", ".##."];
        let font = build_font(1, 6, 8, &[('x', 0, 0, 5, rows)]);
        let cov = font.glyph('x' as u32).unwrap().coverage();
        let expected: Vec<u8> = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| (c == '#') as u8))
            .collect();
        assert_eq!(cov, expected);
    }

    #[test]
    fn test_anti_aliased_coverage() {
        let font = build_font(2, 4, 6, &[('o', 0, 0, 4, &["123", "#.#"])]);
        assert!(font.is_anti_aliased());
        assert_eq!(font.max_coverage(), 3);
        assert_eq!(font.alpha_scale(), 10);
        let cov = font.glyph('o' as u32).unwrap().coverage();
        assert_eq!(cov, [1, 2, 3, 3, 0, 3]);
    }

    #[test]
    fn test_second_index_range() {
        let mut font = *build_font(1, 3, 4, &[('A', 0, 0, 2, &["#"]), ('B', 0, 0, 3, &["##"])]);
        // 'A' lives in the first range, 'z' maps onto the slot after it
        font.index1_last = b'A';
        font.index2_first = b'z';
        font.index2_last = b'z';
        assert_eq!(font.glyph('z' as u32).unwrap().delta, 3);
        assert!(font.glyph('B' as u32).is_none());
    }

    #[test]
    fn test_nonzero_encoding_rejected() {
        let font = PackedFont {
            index: &[0, 0],
            data: &[0b1010_0000, 0, 0, 0],
            version: 0,
            reserved: 0,
            index1_first: b'q',
            index1_last: b'q',
            index2_first: 1,
            index2_last: 0,
            bits_index: 16,
            bits_width: 6,
            bits_height: 6,
            bits_xoffset: 5,
            bits_yoffset: 5,
            bits_delta: 6,
            line_space: 8,
            cap_height: 6,
        };
        assert!(font.glyph('q' as u32).is_none());
    }
}
