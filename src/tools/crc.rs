//! CRC checksums for the block-oriented bzip2 stream.
//!
//! Each block carries a CRC-32 computed over the original (pre-RLE1) bytes of that block. The stream
//! footer carries a combined CRC built from every block CRC in order.
//!
//! NOTE: bzip2 uses the MSB-first form of CRC-32 (polynomial 0x04c11db7), NOT the reflected form used
//! by zip and gzip. The two produce different values for the same data.

/// Anything that can checksum the bytes of one block. The encoder resets it at every block start.
pub trait BlockChecksum {
    /// Start a new block.
    fn reset(&mut self);
    /// Add one original (pre-RLE1) byte.
    fn update(&mut self, byte: u8);
    /// Return the finished checksum for the current block.
    fn finalize(&self) -> u32;
}

const CRC_TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0_u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut c = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            c = if c & 0x8000_0000 != 0 {
                (c << 1) ^ 0x04c1_1db7
            } else {
                c << 1
            };
            bit += 1;
        }
        table[i] = c;
        i += 1;
    }
    table
}

/// Default bzip2 block CRC.
#[derive(Debug, Clone, Copy)]
pub struct BzCrc {
    crc: u32,
}

impl BzCrc {
    pub fn new() -> Self {
        Self { crc: 0xffff_ffff }
    }
}

impl Default for BzCrc {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockChecksum for BzCrc {
    fn reset(&mut self) {
        self.crc = 0xffff_ffff;
    }

    #[inline(always)]
    fn update(&mut self, byte: u8) {
        self.crc = (self.crc << 8) ^ CRC_TABLE[((self.crc >> 24) as u8 ^ byte) as usize];
    }

    fn finalize(&self) -> u32 {
        !self.crc
    }
}

/// Compute the block crc for a whole slice. Used mostly by the tests and the reference decoder.
pub fn do_crc(data: &[u8]) -> u32 {
    let mut crc = BzCrc::new();
    data.iter().for_each(|&b| crc.update(b));
    crc.finalize()
}

/// Fold a block crc into the running stream crc.
#[inline]
pub fn combine_stream_crc(stream_crc: u32, block_crc: u32) -> u32 {
    stream_crc.rotate_left(1) ^ block_crc
}
