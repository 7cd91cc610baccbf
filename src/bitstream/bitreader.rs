//! BitReader: reads back a packed bitstream, MSB first.
//!
//! Only the reference decoder used by the tests reads bitstreams, so this reader works over an in-memory
//! slice and returns None once the data runs out.

const BIT_MASK: u8 = 0x80;

#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Bit position of the next read.
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Return the next bit, or None if there is no more data to read.
    pub fn bit(&mut self) -> Option<bool> {
        let byte = *self.data.get(self.pos / 8)?;
        let bit = byte & (BIT_MASK >> (self.pos % 8)) != 0;
        self.pos += 1;
        Some(bit)
    }

    /// Return the next n bits (n <= 32) as an integer.
    pub fn bint(&mut self, n: usize) -> Option<u32> {
        debug_assert!(n <= 32);
        (0..n).try_fold(0_u32, |acc, _| Some(acc << 1 | self.bit()? as u32))
    }

    pub fn byte(&mut self) -> Option<u8> {
        self.bint(8).map(|b| b as u8)
    }

    pub fn bytes(&mut self, n: usize) -> Option<Vec<u8>> {
        (0..n).map(|_| self.byte()).collect()
    }

    /// Debugging function to return the bytes.bits read so far
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.pos / 8, self.pos % 8)
    }

    /// Bits left before the end of the data.
    pub fn remaining(&self) -> usize {
        self.data.len() * 8 - self.pos
    }
}

#[cfg(test)]
mod test {
    use super::BitReader;

    #[test]
    fn read_bits_test() {
        let data = [0b1010_0000, 0xff, 0x12];
        let mut br = BitReader::new(&data);
        assert_eq!(br.bit(), Some(true));
        assert_eq!(br.bit(), Some(false));
        assert_eq!(br.bint(2), Some(0b10));
        assert_eq!(br.loc(), "[0.4]");
        assert_eq!(br.bint(12), Some(0x0ff));
        assert_eq!(br.byte(), Some(0x12));
        assert_eq!(br.remaining(), 0);
        assert_eq!(br.bit(), None);
    }

    #[test]
    fn bytes_test() {
        let mut br = BitReader::new(b"BZh9");
        assert_eq!(br.bytes(3), Some(b"BZh".to_vec()));
        assert_eq!(br.bytes(2), None);
    }
}
