//! The bitstream module is the output side of the compressor.
//!
//! BZIP2 fields are not byte aligned, so everything is packed MSB first into a queue and moved out in
//! whole bytes. Completed bytes are handed to the caller's sink when a block or the stream closes.
//!
//! The reader is only used by the tests to walk a finished stream.
pub mod bitwriter;
#[cfg(test)]
pub mod bitreader;
