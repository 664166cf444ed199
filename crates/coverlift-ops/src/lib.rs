//! # coverlift-ops
//!
//! Enhancement filters over [`PixelBuffer`](coverlift_core::PixelBuffer).
//!
//! # Modules
//!
//! - [`filter`] - Gaussian kernel, separable blur, 3x3 kernel sharpening
//! - [`unsharp`] - Unsharp masking on top of the blur engine
//! - [`denoise`] - Adaptive neighbour-mean denoiser
//! - [`tone`] - Contrast and vibrance
//! - [`resize`] - Separable resampling
//!
//! Every stage leaves the alpha channel untouched (the resampler
//! interpolates it like any other channel) and clamps its output to
//! `[0, 255]`.
//!
//! # Example
//!
//! ```rust
//! use coverlift_core::PixelBuffer;
//! use coverlift_ops::{filter, tone, unsharp};
//!
//! let img = PixelBuffer::filled(32, 32, [90, 120, 200, 255]);
//! let sharp = unsharp::unsharp_mask(&img, 0.8, 1.2, 2.0).unwrap();
//! let punchy = tone::contrast(sharp, 0.1).unwrap();
//! let soft = filter::blur(&punchy, 2.0).unwrap();
//! assert_eq!(soft.dimensions(), (32, 32));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod denoise;
pub mod filter;
pub mod resize;
pub mod tone;
pub mod unsharp;

pub use error::{OpsError, OpsResult};
pub use filter::{GaussianKernel, Kernel3x3, SharpenPreset};
pub use resize::Filter;
