use std::io::Write;

use log::{debug, trace};

use crate::bitstream::bitwriter::BitWriter;
use crate::bwt_algorithms::block_sort::RotationSorter;
use crate::huffman_coding::huffman::MultiTableHuffmanEncoder;
use crate::tools::rle2_mtf::MoveToFrontEncoder;
use crate::tools::symbol_map::{encode_sym_map, SymbolMap};

use super::block::BlockBuffer;

/// What one closed block looked like, for the stream statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockReport {
    pub randomised: bool,
    /// Symbols after MTF and RLE2, including the end-of-block symbol.
    pub symbols: usize,
    pub block_crc: u32,
}

#[allow(clippy::unusual_byte_groupings)]
/// Called by the encoder when a block is full (or the stream ends). Sorts the block, then writes the
/// block header and the huffman coded body to the bitstream. The block must not be empty.
pub fn compress_block<W: Write>(
    bw: &mut BitWriter<W>,
    block: &mut BlockBuffer,
    block_crc: u32,
    sorter: &mut RotationSorter,
    huffman: &MultiTableHuffmanEncoder,
) -> BlockReport {
    let block_len = block.len();

    // For each block, write the block header:
    // Six bytes of magic, 4 bytes of crc data, 1 bit for Randomized flag.
    trace!("Writing magic and CRC at {}.", bw.loc());
    bw.out24(0x18_314159); // magic bits  1-24
    bw.out24(0x18_265359); // magic bits 25-48
    bw.out32(block_crc);

    let (data, in_use) = block.parts_mut();
    let sorted = sorter.sort(data, in_use);

    trace!("Writing randomise bit and key at {}.", bw.loc());
    bw.bit(sorted.randomised);
    bw.out24(0x18_000000 | sorted.orig_ptr);

    // The symbol map reflects the block as sorted, so a randomised block maps its flipped bytes too.
    trace!("Symbol maps written at {}.", bw.loc());
    for word in encode_sym_map(in_use) {
        bw.out16(word);
    }

    let map = SymbolMap::new(in_use);
    let stream = MoveToFrontEncoder::new(block_len).encode(&sorted.bwt, &map);
    debug!(
        "{} bytes in block, {} after MTF & RLE2 coding, {} syms in use",
        block_len,
        stream.symbols.len(),
        stream.alpha_size(),
    );

    huffman.encode(bw, &stream);
    debug!("Bit stream now at {}", bw.loc());

    BlockReport {
        randomised: sorted.randomised,
        symbols: stream.symbols.len(),
        block_crc,
    }
}
