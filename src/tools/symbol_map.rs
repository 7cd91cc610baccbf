//! The symbol map records which byte values occur in a block.
//!
//! On the stream it is a 16 bit word marking which of the 16 ranges of 16 byte values are used,
//! followed by one 16 bit word per used range marking the individual byte values. Inside the encoder
//! the same presence set becomes a dense alphabet: used byte values are numbered in ascending order.

const BIT_MASK: u16 = 0x8000;

/// Dense alphabet built from a presence set.
#[derive(Debug, Clone)]
pub struct SymbolMap {
    /// Byte value -> dense index (only meaningful for used values).
    pub unseq_to_seq: [u8; 256],
    /// Dense index -> byte value.
    pub seq_to_unseq: Vec<u8>,
}

impl SymbolMap {
    pub fn new(in_use: &[bool; 256]) -> Self {
        let mut unseq_to_seq = [0_u8; 256];
        let mut seq_to_unseq = Vec::with_capacity(256);
        for (byte, _) in in_use.iter().enumerate().filter(|(_, &used)| used) {
            unseq_to_seq[byte] = seq_to_unseq.len() as u8;
            seq_to_unseq.push(byte as u8);
        }
        Self {
            unseq_to_seq,
            seq_to_unseq,
        }
    }

    /// Number of byte values in use.
    pub fn len(&self) -> usize {
        self.seq_to_unseq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq_to_unseq.is_empty()
    }
}

/// Build the two level bitmap written to the stream. The first word is the range index.
pub fn encode_sym_map(in_use: &[bool; 256]) -> Vec<u16> {
    let mut maps = vec![0_u16];
    for (range, chunk) in in_use.chunks(16).enumerate() {
        if chunk.iter().any(|&used| used) {
            maps[0] |= BIT_MASK >> range;
            let word = chunk
                .iter()
                .enumerate()
                .filter(|(_, &used)| used)
                .fold(0_u16, |word, (i, _)| word | BIT_MASK >> i);
            maps.push(word);
        }
    }
    maps
}

/// Takes the two level bitmap and returns a sorted vec of all bytes it marks.
#[cfg(test)]
pub fn decode_sym_map(symbol_map: &[u16]) -> Vec<u8> {
    let mut symbols: Vec<u8> = Vec::with_capacity(256);
    let mut map_idx = 0;
    for range in 0..16 {
        if (symbol_map[0] & (BIT_MASK >> range)) > 0 {
            map_idx += 1;
            for byte_idx in 0..16_u8 {
                if (symbol_map[map_idx] & (BIT_MASK >> byte_idx)) > 0 {
                    symbols.push((range << 4) + byte_idx);
                };
            }
        }
    }
    symbols
}
