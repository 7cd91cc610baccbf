//! Run-Length-Encoding phase 1 for the Rust version of the standard BZIP2 library.
//!
//! Runs of identical bytes are collapsed before they reach the block. A run of 1-3 bytes is written
//! as is. A run of 4-255 bytes is written as four copies of the byte followed by a count byte holding
//! the number of extra repeats (0-251). Count bytes share the 0-255 value space with literals and
//! both mark the block's presence set.

use crate::compression::block::BlockBuffer;

/// A run is force-flushed when it reaches this length.
pub const MAX_RUN: u32 = 255;

/// One completed run, ready to be written into a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub byte: u8,
    pub len: u32,
}

impl Run {
    /// Write the run into the block in RLE1 form.
    pub fn write_to(&self, block: &mut BlockBuffer) {
        match self.len {
            1..=3 => (0..self.len).for_each(|_| block.push(self.byte)),
            _ => {
                (0..4).for_each(|_| block.push(self.byte));
                block.push((self.len - 4) as u8);
            }
        }
    }
}

/// Collects input bytes one at a time into runs.
#[derive(Debug, Default)]
pub struct RunLengthPreFilter {
    current: Option<u8>,
    run: u32,
}

impl RunLengthPreFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte. Returns the run that must be written before this byte can be kept, if any.
    #[inline]
    pub fn push(&mut self, byte: u8) -> Option<Run> {
        match self.current {
            Some(current) if current == byte => {
                self.run += 1;
                if self.run == MAX_RUN {
                    self.current = None;
                    self.run = 0;
                    return Some(Run {
                        byte,
                        len: MAX_RUN,
                    });
                }
                None
            }
            Some(current) => {
                let done = Run {
                    byte: current,
                    len: self.run,
                };
                self.current = Some(byte);
                self.run = 1;
                Some(done)
            }
            None => {
                self.current = Some(byte);
                self.run = 1;
                None
            }
        }
    }

    /// Return any pending run (used when the stream closes).
    pub fn take(&mut self) -> Option<Run> {
        let byte = self.current.take()?;
        let len = std::mem::take(&mut self.run);
        Some(Run { byte, len })
    }
}

/// Convenience encoder for a whole slice into one unbounded block. Returns the encoded bytes.
#[cfg(test)]
pub fn rle1_encode(data: &[u8]) -> Vec<u8> {
    let mut block = BlockBuffer::new(9);
    let mut filter = RunLengthPreFilter::new();
    for &b in data {
        if let Some(run) = filter.push(b) {
            run.write_to(&mut block);
        }
    }
    if let Some(run) = filter.take() {
        run.write_to(&mut block);
    }
    block.data().to_vec()
}
