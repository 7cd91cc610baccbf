use std::io::{self, Write};

use log::{debug, info, trace, warn};

use crate::bitstream::bitwriter::BitWriter;
use crate::bwt_algorithms::block_sort::RotationSorter;
use crate::error::{BzError, Result};
use crate::huffman_coding::huffman::MultiTableHuffmanEncoder;
use crate::tools::cli::BzOpts;
use crate::tools::crc::{combine_stream_crc, BlockChecksum, BzCrc};
use crate::tools::rle1::{Run, RunLengthPreFilter};

use super::block::BlockBuffer;
use super::compress_block::compress_block;

/*
    The encoder takes bytes one at a time. Each byte goes through the RLE1 pre-filter, and each
    completed run goes into the current block along with the block CRC. When a run would not fit,
    the block is closed: sorted, coded and written to the bitstream, and a fresh block starts.

    Nothing is written for an empty block. Closing the stream flushes the pending run and the
    last block, then writes the stream trailer and pads to a byte boundary.
*/

/// Running totals for one stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Blocks written.
    pub blocks: u32,
    /// Blocks that needed the randomisation fallback.
    pub blocks_randomised: u32,
    /// Bytes accepted from the caller.
    pub bytes_in: u64,
    /// Bytes handed to the sink.
    pub bytes_out: u64,
}

/// Streaming bzip2 compressor writing to any `Write` sink.
pub struct BzEncoder<W: Write, C: BlockChecksum = BzCrc> {
    /// Taken when the stream is finished.
    bw: Option<BitWriter<W>>,
    block: BlockBuffer,
    rle: RunLengthPreFilter,
    crc: C,
    stream_crc: u32,
    sorter: RotationSorter,
    huffman: MultiTableHuffmanEncoder,
    stats: StreamStats,
}

impl<W: Write> BzEncoder<W, BzCrc> {
    /// Create an encoder and write the stream header.
    pub fn new(writer: W, opts: &BzOpts) -> Result<Self> {
        Self::with_checksum(writer, opts, BzCrc::new())
    }
}

impl<W: Write, C: BlockChecksum> BzEncoder<W, C> {
    /// Create an encoder with a caller supplied block checksum and write the stream header.
    pub fn with_checksum(writer: W, opts: &BzOpts, mut crc: C) -> Result<Self> {
        let level = opts.level();
        let block = BlockBuffer::new(level);
        let mut bw = BitWriter::new(writer, block.capacity());

        trace!("Writing stream header at {}.", bw.loc());
        if opts.prepend_magic {
            bw.out8(b'B');
            bw.out8(b'Z');
        }
        bw.out8(b'h');
        bw.out8(b'0' + level);
        bw.drain_to_sink()?;

        crc.reset();
        let stats = StreamStats {
            bytes_out: bw.bytes_out(),
            ..StreamStats::default()
        };
        info!(
            "Stream opened: level {}, work factor {}, {} huffman passes",
            level,
            opts.work_factor(),
            opts.iterations()
        );
        Ok(Self {
            sorter: RotationSorter::new(block.capacity(), opts.work_factor()),
            bw: Some(bw),
            block,
            rle: RunLengthPreFilter::new(),
            crc,
            stream_crc: 0,
            huffman: MultiTableHuffmanEncoder::new(opts.iterations()),
            stats,
        })
    }

    /// Push one byte into the stream. Fails with `Abandoned` once a sink error has ended the stream.
    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        if self.bw.is_none() {
            return Err(BzError::Abandoned);
        }
        self.stats.bytes_in += 1;
        match self.rle.push(byte) {
            Some(run) => self.put_run(run),
            None => Ok(()),
        }
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Close the stream and return the sink.
    pub fn finish(mut self) -> Result<W> {
        if self.bw.is_none() {
            return Err(BzError::Abandoned);
        }
        self.close_stream()?;
        self.bw.take().map(BitWriter::into_inner).ok_or(BzError::Abandoned)
    }

    /// Write a completed run into the block, closing the block first if the run might not fit.
    /// If closing fails the stream is abandoned and the run goes with it.
    fn put_run(&mut self, run: Run) -> Result<()> {
        if !self.block.has_room() {
            self.close_block()?;
        }
        (0..run.len).for_each(|_| self.crc.update(run.byte));
        run.write_to(&mut self.block);
        Ok(())
    }

    /// Sort, code and write the current block, then start a new one.
    fn close_block(&mut self) -> Result<()> {
        if self.block.is_empty() {
            return Ok(());
        }
        let bw = match self.bw.as_mut() {
            Some(bw) => bw,
            None => return Err(BzError::Abandoned),
        };

        let block_crc = self.crc.finalize();
        self.stream_crc = combine_stream_crc(self.stream_crc, block_crc);
        let block_no = self.stats.blocks + 1;
        info!("Starting block {}", block_no);

        let report = compress_block(bw, &mut self.block, block_crc, &mut self.sorter, &self.huffman);
        debug!(
            "Block {}: crc {:08x}, {} symbols, stream crc now {:08x}",
            block_no, report.block_crc, report.symbols, self.stream_crc
        );

        // The block is in the bit writer now. Whatever the sink does, it is never coded again.
        self.block.clear();
        self.crc.reset();
        self.drain(false)?;

        self.stats.blocks = block_no;
        if report.randomised {
            self.stats.blocks_randomised += 1;
        }
        info!(
            "Wrote block {}. Stream length is {} bytes.",
            block_no, self.stats.bytes_out
        );
        Ok(())
    }

    /// Flush the pending run and last block, then write the trailer. Does nothing once closed.
    fn close_stream(&mut self) -> Result<()> {
        if self.bw.is_none() {
            return Ok(());
        }
        if let Some(run) = self.rle.take() {
            self.put_run(run)?;
        }
        self.close_block()?;

        if let Some(bw) = self.bw.as_mut() {
            trace!("Writing stream trailer at {}.", bw.loc());
            bw.out24(0x18_177245); // magic bits  1-24
            bw.out24(0x18_385090); // magic bits 25-48
            bw.out32(self.stream_crc);
            bw.pad();
        }
        self.drain(true)?;
        info!(
            "{} bytes in, {} bytes out, {} blocks ({} randomised), stream crc {:08x}",
            self.stats.bytes_in,
            self.stats.bytes_out,
            self.stats.blocks,
            self.stats.blocks_randomised,
            self.stream_crc
        );
        Ok(())
    }

    /// Hand completed bytes to the sink, flushing it too if asked. On a sink error the bit writer
    /// is dropped, so the partial stream is abandoned and nothing is written again.
    fn drain(&mut self, flush: bool) -> Result<()> {
        let bw = match self.bw.as_mut() {
            Some(bw) => bw,
            None => return Err(BzError::Abandoned),
        };
        let mut result = bw.drain_to_sink();
        if flush && result.is_ok() {
            result = bw.flush_sink();
        }
        self.stats.bytes_out = bw.bytes_out();
        if let Err(e) = result {
            warn!("Sink error after {} bytes, abandoning stream: {}", self.stats.bytes_out, e);
            self.bw = None;
            return Err(BzError::Io(e));
        }
        Ok(())
    }
}

impl<W: Write, C: BlockChecksum> Write for BzEncoder<W, C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            self.write_byte(byte)?;
        }
        Ok(buf.len())
    }

    /// Forwards completed output to the sink. Never closes a block.
    fn flush(&mut self) -> io::Result<()> {
        Ok(self.drain(true)?)
    }
}

impl<W: Write, C: BlockChecksum> Drop for BzEncoder<W, C> {
    fn drop(&mut self) {
        if self.bw.is_some() {
            let _ = self.close_stream();
        }
    }
}

/// Compress a whole buffer into a complete .bz2 image, "BZ" magic included.
pub fn compress(data: &[u8], opts: &BzOpts) -> Result<Vec<u8>> {
    let opts = BzOpts {
        prepend_magic: true,
        ..opts.clone()
    };
    let mut encoder = BzEncoder::new(Vec::with_capacity(data.len() / 2 + 64), &opts)?;
    encoder.write_all(data)?;
    encoder.finish()
}
