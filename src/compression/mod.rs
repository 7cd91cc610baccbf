//! The compression module drives a stream from raw bytes to the finished bitstream.
//!
//! Each block goes through the following steps:
//! - Run Length Encoding 1: Runs of 4-255 identical bytes become four bytes and a count.
//! - Burrows Wheeler Transform: Sort all rotations of the block so similar contexts sit together.
//! - Move To Front transform: Recently seen bytes get small indices.
//! - Run Length Encoding 2: Runs of index zero are written as RUNA/RUNB digits.
//! - Huffman coding: Groups of 50 symbols are coded with the best of two to six tables.
//!
//! The RLE1 stage happens as bytes arrive, so the block buffer always holds RLE1 output. Everything after that
//! happens when a block is closed.
//!
//! The decompress module is a reference decoder compiled only for the tests.

pub mod block;
pub mod compress;
pub mod compress_block;
#[cfg(test)]
pub mod decompress;
