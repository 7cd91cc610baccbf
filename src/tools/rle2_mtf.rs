//! Perform move-to-front and run-length-encoding 2 transforms for the Rust version of the standard BZIP2 library.
//!
//! The move-to-front transform will increase the frequency of lower index values. The result of this is that
//! the huffman codes can more efficiently compress those high frequency symbols.
//!
//! Index zero is never written directly. Runs of zeros are written as their length in bijective base 2,
//! using RUNA for a 1 digit and RUNB for a 2 digit, least significant digit first. Every other index i is
//! written as symbol i + 1. One EOB symbol (alphabet size - 1) closes the block.
//!
//! Encoding also returns a frequency table used during the huffman stage.
//!
use super::symbol_map::SymbolMap;

pub const RUNA: u16 = 0;
pub const RUNB: u16 = 1;
/// Largest alphabet: RUNA, RUNB, 255 non-zero indexes and EOB.
pub const MAX_ALPHA_SIZE: usize = 258;

/// The symbol stream consumed by the huffman stage.
#[derive(Debug, Clone)]
pub struct SymbolStream {
    pub symbols: Vec<u16>,
    pub freqs: [u32; MAX_ALPHA_SIZE],
    /// The end-of-block symbol, also the largest symbol in this block's alphabet.
    pub eob: u16,
}

impl SymbolStream {
    /// Number of symbols in this block's alphabet (RUNA/RUNB + indexes + EOB).
    pub fn alpha_size(&self) -> usize {
        self.eob as usize + 1
    }
}

/// Move-to-front encoder restricted to the byte values present in the block.
#[derive(Debug)]
pub struct MoveToFrontEncoder {
    mtf_index: [u8; 256],
    symbols: Vec<u16>,
    freqs: [u32; MAX_ALPHA_SIZE],
    zeros: usize,
}

impl MoveToFrontEncoder {
    pub fn new(capacity: usize) -> Self {
        Self {
            mtf_index: [0; 256],
            symbols: Vec::with_capacity(capacity + 1),
            freqs: [0; MAX_ALPHA_SIZE],
            zeros: 0,
        }
    }

    /// Encode one block of BWT output. The map must cover every byte in `bwt`.
    pub fn encode(mut self, bwt: &[u8], map: &SymbolMap) -> SymbolStream {
        let in_use = map.len();
        for (i, slot) in self.mtf_index.iter_mut().take(in_use).enumerate() {
            *slot = i as u8;
        }
        let eob = in_use as u16 + 1;

        for &byte in bwt {
            let seq = map.unseq_to_seq[byte as usize];
            let idx = self.move_to_front(seq);
            if idx == 0 {
                self.zeros += 1;
                continue;
            }
            self.flush_zeros();
            self.emit(idx as u16 + 1);
        }
        self.flush_zeros();
        self.emit(eob);

        SymbolStream {
            symbols: self.symbols,
            freqs: self.freqs,
            eob,
        }
    }

    /// Find the symbol's current index, move it to the front, and return the index.
    #[inline]
    fn move_to_front(&mut self, seq: u8) -> usize {
        let mut idx = 0;
        let mut carry = self.mtf_index[0];
        while carry != seq {
            idx += 1;
            std::mem::swap(&mut carry, &mut self.mtf_index[idx]);
        }
        self.mtf_index[0] = carry;
        idx
    }

    /// Write any pending zero run as RUNA/RUNB digits.
    fn flush_zeros(&mut self) {
        if self.zeros == 0 {
            return;
        }
        let mut n = self.zeros - 1;
        loop {
            self.emit((n & 1) as u16);
            if n < 2 {
                break;
            }
            n = (n - 2) >> 1;
        }
        self.zeros = 0;
    }

    #[inline]
    fn emit(&mut self, symbol: u16) {
        self.symbols.push(symbol);
        self.freqs[symbol as usize] += 1;
    }
}
