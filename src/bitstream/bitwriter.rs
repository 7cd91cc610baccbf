//! BitWriter: the output side of the I/O subsystem.
//!
//! Bits are packed MSB first into a 64 bit queue. Full bytes move from the queue into an output buffer,
//! and the buffer is handed to the sink whenever the caller asks for it (normally once per block).
//! Nothing here makes decisions about the format; it only packs what it is given.

use std::io::Write;

/// Writes a packed bitstream to any `Write` sink.
#[derive(Debug)]
pub struct BitWriter<W> {
    /// Output buffer of completed bytes not yet handed to the sink.
    output: Vec<u8>,
    /// Private queue to hold bits that are waiting to be put as bytes into the output buffer.
    queue: u64,
    /// Count of valid bits in the queue.
    q_bits: u8,
    /// Bytes handed to the sink so far.
    bytes_out: u64,
    writer: W,
}

impl<W: Write> BitWriter<W> {
    /// Create a new BitWriter. `size` is the initial capacity of the output buffer; the block size
    /// is a good choice.
    pub fn new(writer: W, size: usize) -> Self {
        Self {
            output: Vec::with_capacity(size),
            queue: 0,
            q_bits: 0,
            bytes_out: 0,
            writer,
        }
    }

    /// Move all full bytes from the queue to the output buffer.
    #[inline(always)]
    fn push_queue(&mut self) {
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte);
            self.q_bits -= 8;
        }
    }

    /*
    NOTE: out24 takes a u32.  The 8 most significant bits of the word indicate how
    many of the least significant bits will be written. Those bits must be aligned to
    the least signficant bit. (The middle bits are masked out.)

    Eg 00000100_00000000_00000000_00000010 writes out 0010.
    */
    /// Writes 0-24 bits encoded with the number of bits to write in the most
    /// significant byte of a 32 bit word.
    #[inline(always)]
    pub fn out24(&mut self, data: u32) {
        let depth = (data >> 24) as u8;
        self.put(depth, data & (0x00ff_ffff >> (24 - depth.min(24))));
    }

    /// Write the low `n` bits of `v` (n <= 32).
    #[inline(always)]
    pub fn put(&mut self, n: u8, v: u32) {
        debug_assert!(n <= 32);
        if n == 0 {
            return;
        }
        self.queue <<= n;
        self.queue |= (v as u64) & ((1_u64 << n) - 1);
        self.q_bits += n;
        self.push_queue();
    }

    /// Puts a 32 bit word on the stream.
    pub fn out32(&mut self, data: u32) {
        self.put(32, data);
    }

    /// Puts a 16 bit word on the stream.
    pub fn out16(&mut self, data: u16) {
        self.put(16, data as u32);
    }

    /// Puts a byte on the stream.
    pub fn out8(&mut self, data: u8) {
        self.put(8, data as u32);
    }

    /// Write a single bit.
    pub fn bit(&mut self, set: bool) {
        self.put(1, set as u32);
    }

    /// Pad the remaining bits (1-7) of the queue with zeros so the stream ends on a byte boundary.
    pub fn pad(&mut self) {
        if self.q_bits > 0 {
            let fill = 8 - self.q_bits;
            self.put(fill, 0);
        }
    }

    /// Hand every completed byte to the sink. Bits still in the queue carry over.
    pub fn drain_to_sink(&mut self) -> std::io::Result<()> {
        if !self.output.is_empty() {
            self.writer.write_all(&self.output)?;
            self.bytes_out += self.output.len() as u64;
            self.output.clear();
        }
        Ok(())
    }

    /// Flush the sink itself.
    pub fn flush_sink(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    /// Bytes the sink has accepted so far.
    pub fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        let bits = (self.bytes_out as usize + self.output.len()) * 8 + self.q_bits as usize;
        format!("[{}.{}]", bits / 8, bits % 8)
    }

    /// Return the sink. Any bits still queued are lost, so call `pad` and `drain_to_sink` first.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
