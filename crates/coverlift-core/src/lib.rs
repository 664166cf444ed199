//! # coverlift-core
//!
//! Core types for the coverlift image enhancement pipeline.
//!
//! - [`PixelBuffer`] - Owned RGBA8 raster, the value every filter stage
//!   consumes and produces
//! - [`Error`], [`Result`] - Buffer construction errors
//!
//! ## Crate Structure
//!
//! ```text
//! coverlift-core (this crate)
//!    ^
//!    |
//!    +-- coverlift-ops (filters, resampling)
//!    +-- coverlift-io (decode / PNG encode)
//!    +-- coverlift-worker (pipelines, job dispatch)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;

pub use buffer::{CHANNELS, PixelBuffer, quantize};
pub use error::{Error, Result};
