//! Error types for coverlift-core.
//!
//! # Usage
//!
//! ```rust
//! use coverlift_core::{Error, PixelBuffer};
//!
//! let err = PixelBuffer::from_raw(2, 2, vec![0u8; 3]).unwrap_err();
//! assert!(matches!(err, Error::BufferSize { expected: 16, got: 3 }));
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while constructing or addressing a [`crate::PixelBuffer`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Width or height is zero, or `width * height * 4` overflows `usize`.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Sample vector length does not equal `width * height * 4`.
    #[error("buffer size mismatch: expected {expected} bytes, got {got}")]
    BufferSize {
        /// Required length in bytes
        expected: usize,
        /// Provided length in bytes
        got: usize,
    },
}
