//! The tools module provides the smaller stages and helpers of the compressor.
//!
//! The tools are:
//! - cli: Options, validation and the command line interface.
//! - crc: CRC32 checksum for BZIP2, both block and stream versions.
//! - rle1: Run-Length-Encoding phase 1.
//! - rle2_mtf: Move-To-Front transform and Run-Length-Encoding phase 2 (integrated for speed).
//! - symbol_map: Presence bitmap and the dense alphabet built from it.
//!
pub mod cli;
pub mod crc;
pub mod rle1;
pub mod rle2_mtf;
pub mod symbol_map;
