//! Error types for decode/encode operations.

use std::io;
use thiserror::Error;

/// Codec error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The bytes do not start with a recognised image signature.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Decoded raster did not form a valid buffer.
    #[error(transparent)]
    Core(#[from] coverlift_core::Error),
}

/// Result type for codec operations.
pub type IoResult<T> = Result<T, IoError>;
