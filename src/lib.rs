//! A streaming BZIP2 compressor.
//!
//! Bytes are pushed in through `BzEncoder` (or `std::io::Write`), and a complete bzip2 stream comes out of the
//! sink it wraps. The stream is byte compatible with the standard bzip2 format: with `prepend_magic` set the output
//! is a regular .bz2 file.
//!
//! Basic usage:
//!
//! ```
//! use std::io::Write;
//! use bzstream::{BzEncoder, BzOpts};
//!
//! let opts = BzOpts { prepend_magic: true, ..BzOpts::default() };
//! let mut encoder = BzEncoder::new(Vec::new(), &opts).unwrap();
//! encoder.write_all(b"hello hello hello").unwrap();
//! let bz2 = encoder.finish().unwrap();
//! assert_eq!(&bz2[..4], b"BZh9");
//! ```
//!
//! The binary does the same for a file or standard input:
//!
//! `$> bzstream -b 9 test.txt -o test.txt.bz2`
//!
pub mod bitstream;
pub mod bwt_algorithms;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use compression::compress::{compress, BzEncoder, StreamStats};
pub use error::{BzError, Result};
pub use tools::cli::BzOpts;
pub use tools::crc::{combine_stream_crc, BlockChecksum, BzCrc};
