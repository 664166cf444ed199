//! Unsharp masking.
//!
//! Sharpens by adding back the difference between an image and its
//! Gaussian-blurred copy:
//!
//! ```text
//! diff = original - blur(original, radius)
//! out  = |diff| >= threshold ? clamp(original + amount * diff) : original
//! ```
//!
//! The blur uses the edge policy of [`crate::filter::blur`], so pixels near
//! the border see a larger `diff` than the interior of a flat region.

use coverlift_core::{CHANNELS, PixelBuffer, quantize};
use rayon::prelude::*;
use tracing::trace;

use crate::filter::{COLOR_CHANNELS, blur};
use crate::{OpsError, OpsResult};

/// Applies an unsharp mask.
///
/// * `amount` - Gain applied to the high-pass difference
/// * `radius` - Sigma of the Gaussian blur
/// * `threshold` - Minimum absolute difference (in sample units) that gets
///   sharpened; smaller differences are left alone
///
/// # Example
///
/// ```rust
/// use coverlift_core::PixelBuffer;
/// use coverlift_ops::unsharp::unsharp_mask;
///
/// let flat = PixelBuffer::filled(16, 16, [120, 60, 30, 255]);
/// let out = unsharp_mask(&flat, 1.2, 1.0, 1.0).unwrap();
/// assert_eq!(out.pixel(8, 8), [120, 60, 30, 255]);
/// ```
pub fn unsharp_mask(
    src: &PixelBuffer,
    amount: f32,
    radius: f32,
    threshold: f32,
) -> OpsResult<PixelBuffer> {
    if !amount.is_finite() || !threshold.is_finite() {
        return Err(OpsError::InvalidParameter(format!(
            "unsharp amount and threshold must be finite, got {amount} / {threshold}"
        )));
    }
    trace!(amount, radius, threshold, "unsharp_mask");

    let blurred = blur(src, radius)?;
    let mut dst = src.clone();

    dst.as_raw_mut()
        .par_chunks_mut(CHANNELS)
        .zip(src.as_raw().par_chunks(CHANNELS))
        .zip(blurred.as_raw().par_chunks(CHANNELS))
        .for_each(|((out, orig), soft)| {
            for c in 0..COLOR_CHANNELS {
                let diff = orig[c] as f32 - soft[c] as f32;
                if diff.abs() >= threshold {
                    out[c] = quantize(orig[c] as f32 + amount * diff);
                }
            }
        });

    Ok(dst)
}
