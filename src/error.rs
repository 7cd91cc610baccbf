//! Error types for bzstream operations.

use std::io;
use thiserror::Error;

/// The main error type for bzstream operations.
#[derive(Debug, Error)]
pub enum BzError {
    /// I/O error from the underlying sink or source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Block size level outside 1-9.
    #[error("Invalid block size level {0}: expected 1-9")]
    InvalidLevel(u8),

    /// Work factor outside 1-250.
    #[error("Invalid work factor {0}: expected 1-250")]
    InvalidWorkFactor(u32),

    /// Huffman refinement passes outside 1-10.
    #[error("Invalid iteration count {0}: expected 1-10")]
    InvalidIterations(usize),

    /// The sink failed earlier; the partial stream was abandoned and nothing more is written.
    #[error("Stream abandoned after an earlier write error")]
    Abandoned,
}

/// Result type for bzstream operations.
pub type Result<T> = std::result::Result<T, BzError>;

impl From<BzError> for io::Error {
    fn from(err: BzError) -> Self {
        match err {
            BzError::Io(e) => e,
            BzError::Abandoned => io::Error::new(io::ErrorKind::Other, BzError::Abandoned),
            other => io::Error::new(io::ErrorKind::InvalidInput, other),
        }
    }
}
