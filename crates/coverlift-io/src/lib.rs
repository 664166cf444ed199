//! # coverlift-io
//!
//! Turns uploaded bytes into a [`PixelBuffer`](coverlift_core::PixelBuffer)
//! and back.
//!
//! - [`decode`] - Format sniffing, header-only dimension probe, full RGBA8
//!   decode (PNG, JPEG, WebP, GIF, BMP)
//! - [`png`] - Lossless PNG encoding, the only output container
//!
//! # Example
//!
//! ```rust
//! use coverlift_core::PixelBuffer;
//! use coverlift_io::{decode, png};
//!
//! let img = PixelBuffer::filled(8, 4, [10, 20, 30, 255]);
//! let bytes = png::encode(&img, png::Compression::Fast).unwrap();
//!
//! assert_eq!(decode::probe_dimensions(&bytes).unwrap(), (8, 4));
//! assert_eq!(decode::decode(&bytes).unwrap(), img);
//! ```

#![warn(missing_docs)]

mod error;
pub mod decode;
pub mod png;

pub use error::{IoError, IoResult};
