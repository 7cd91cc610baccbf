//! The block buffer collects RLE1 output until the block is full.
//!
//! The buffer is allocated once per stream at the full block size plus the overshoot margin used by
//! the rotation sorter, so closing a block never reallocates.

use crate::bwt_algorithms::OVERSHOOT;

/// Bytes held back at the end of each block. One RLE1 run can add up to five bytes after the room
/// check passes.
pub const BLOCK_RESERVE: usize = 20;

/// Accumulates RLE1 encoded bytes and tracks which byte values have been used.
#[derive(Debug)]
pub struct BlockBuffer {
    data: Vec<u8>,
    in_use: [bool; 256],
    capacity: usize,
}

impl BlockBuffer {
    /// Create an empty block for the given level (1-9, already validated).
    pub fn new(level: u8) -> Self {
        let capacity = level as usize * 100_000;
        Self {
            data: Vec::with_capacity(capacity + OVERSHOOT),
            in_use: [false; 256],
            capacity,
        }
    }

    /// True while another run may be appended to this block.
    #[inline]
    pub fn has_room(&self) -> bool {
        self.data.len() <= self.capacity - BLOCK_RESERVE
    }

    /// Append one encoded byte and record its value in the presence set.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.in_use[byte as usize] = true;
        self.data.push(byte);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn in_use(&self) -> &[bool; 256] {
        &self.in_use
    }

    /// Hand the filled region and the presence set to the sorting stage.
    pub fn parts_mut(&mut self) -> (&mut Vec<u8>, &mut [bool; 256]) {
        (&mut self.data, &mut self.in_use)
    }

    /// Reset for the next block, keeping the allocation.
    pub fn clear(&mut self) {
        self.data.clear();
        self.in_use = [false; 256];
    }
}
