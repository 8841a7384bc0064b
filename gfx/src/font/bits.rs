//! MSB-first bit reader over font data

/// Cursor into a byte slice, addressed in bits
///
/// Bit 0 is the most significant bit of byte 0. Reads past the end yield
/// zero bits, so a truncated glyph renders blank instead of faulting.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Start at bit `pos`
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn skip(&mut self, bits: usize) {
        self.pos += bits;
    }

    /// Advance to the next byte boundary
    pub fn align_byte(&mut self) {
        self.pos = (self.pos + 7) & !7;
    }

    pub fn read_bit(&mut self) -> u32 {
        let bit = self
            .data
            .get(self.pos >> 3)
            .map_or(0, |&byte| (byte >> (7 - (self.pos & 7))) & 1);
        self.pos += 1;
        bit as u32
    }

    /// Unsigned field of `bits` (at most 32) bits
    pub fn read_unsigned(&mut self, bits: u8) -> u32 {
        let mut value = 0u32;
        for _ in 0..bits.min(32) {
            value = (value << 1) | self.read_bit();
        }
        value
    }

    /// Two's complement field of `bits` bits
    pub fn read_signed(&mut self, bits: u8) -> i32 {
        let bits = bits.min(32);
        let value = self.read_unsigned(bits) as i64;
        if bits == 0 || value & (1 << (bits - 1)) == 0 {
            value as i32
        } else {
            (value - (1i64 << bits)) as i32
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use alloc::vec::Vec;

    /// Packs fields MSB first, the inverse of [`BitReader`]
    #[derive(Default)]
    pub(crate) struct BitWriter {
        bytes: Vec<u8>,
        len: usize,
    }

    impl BitWriter {
        pub fn push(&mut self, value: u32, bits: u8) {
            for i in (0..bits).rev() {
                if self.len % 8 == 0 {
                    self.bytes.push(0);
                }
                if (value >> i) & 1 != 0 {
                    let last = self.bytes.len() - 1;
                    self.bytes[last] |= 0x80 >> (self.len % 8);
                }
                self.len += 1;
            }
        }

        pub fn push_signed(&mut self, value: i32, bits: u8) {
            self.push(value as u32 & ((1u64 << bits) - 1) as u32, bits);
        }

        pub fn align(&mut self) {
            self.len = self.bytes.len() * 8;
        }

        pub fn bit_len(&self) -> usize {
            self.len
        }

        pub fn into_bytes(self) -> Vec<u8> {
            self.bytes
        }
    }

    #[test]
    fn test_read_fields() {
        let data = [0b1011_0011, 0b1100_0000];
        let mut r = BitReader::new(&data);
        assert_eq!(r.read_bit(), 1);
        assert_eq!(r.read_unsigned(3), 0b011);
        assert_eq!(r.read_unsigned(6), 0b0011_11);
        assert_eq!(r.position(), 10);
    }

    #[test]
    fn test_signed_fields() {
        let mut w = BitWriter::default();
        w.push_signed(-3, 4);
        w.push_signed(5, 4);
        w.push_signed(-1, 1);
        let bytes = w.into_bytes();
        let mut r = BitReader::new(&bytes);
        assert_eq!(r.read_signed(4), -3);
        assert_eq!(r.read_signed(4), 5);
        assert_eq!(r.read_signed(1), -1);
        assert_eq!(r.read_signed(0), 0);
    }

    #[test]
    fn test_align_and_overrun() {
        let data = [0xFF];
        let mut r = BitReader::at(&data, 3);
        r.align_byte();
        assert_eq!(r.position(), 8);
        assert_eq!(r.read_unsigned(8), 0);
        r.align_byte();
        assert_eq!(r.position(), 16);
    }

    #[test]
    fn test_writer_alignment() {
        let mut w = BitWriter::default();
        w.push(1, 1);
        w.align();
        assert_eq!(w.bit_len(), 8);
        w.push(0b11, 2);
        assert_eq!(w.into_bytes(), [0x80, 0xC0]);
    }
}
