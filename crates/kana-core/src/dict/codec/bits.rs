//! MSB-first bit packing.

use super::huffman::Code;

/// Appends bits most-significant-first into a byte vector.
#[derive(Debug, Default)]
pub(crate) struct BitWriter {
    bytes: Vec<u8>,
    current: u8,
    filled: u8,
    bit_len: u64,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_bit(&mut self, bit: bool) {
        self.current = (self.current << 1) | u8::from(bit);
        self.filled += 1;
        self.bit_len += 1;
        if self.filled == 8 {
            self.bytes.push(self.current);
            self.current = 0;
            self.filled = 0;
        }
    }

    pub fn push_code(&mut self, code: Code) {
        for i in 0..code.len() {
            self.push_bit(code.bit(i));
        }
    }

    pub fn bit_len(&self) -> u64 {
        self.bit_len
    }

    /// Flush the partial byte, zero-padded on the right.
    pub fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.bytes.push(self.current << (8 - self.filled));
        }
        self.bytes
    }
}

/// Bit `pos` of an MSB-first stream.
pub(crate) fn bit_at(bytes: &[u8], pos: u64) -> Option<bool> {
    let byte = *bytes.get(usize::try_from(pos >> 3).ok()?)?;
    Some((byte >> (7 - (pos & 7))) & 1 == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first_with_padding() {
        let mut w = BitWriter::new();
        for bit in [true, false, true] {
            w.push_bit(bit);
        }
        assert_eq!(w.bit_len(), 3);
        assert_eq!(w.finish(), vec![0b1010_0000]);
    }

    #[test]
    fn test_full_bytes_are_not_padded() {
        let mut w = BitWriter::new();
        for _ in 0..16 {
            w.push_bit(true);
        }
        assert_eq!(w.finish(), vec![0xFF, 0xFF]);
    }

    #[test]
    fn test_bit_at() {
        let bytes = [0b1000_0001, 0b0100_0000];
        assert_eq!(bit_at(&bytes, 0), Some(true));
        assert_eq!(bit_at(&bytes, 1), Some(false));
        assert_eq!(bit_at(&bytes, 7), Some(true));
        assert_eq!(bit_at(&bytes, 9), Some(true));
        assert_eq!(bit_at(&bytes, 16), None);
    }
}
