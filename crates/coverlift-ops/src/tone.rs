//! Per-pixel tone adjustments: contrast and vibrance.
//!
//! Both stages consume their input buffer and return it, rewritten in
//! place. An amount of exactly `0` returns the buffer untouched.

use coverlift_core::{CHANNELS, PixelBuffer, quantize};
use rayon::prelude::*;
use tracing::trace;

use crate::filter::COLOR_CHANNELS;
use crate::{OpsError, OpsResult};

/// Contrast pivot. Samples equal to the pivot are fixed points.
pub const CONTRAST_PIVOT: f32 = 128.0;

/// Returns the contrast multiplier for `amount`.
///
/// `factor = 259 * (amount * 255 + 255) / (255 * (259 - amount * 255))`
///
/// Fails when the factor is not finite (`amount` at or near `259 / 255`).
pub fn contrast_factor(amount: f32) -> OpsResult<f32> {
    let scaled = amount * 255.0;
    let factor = (259.0 * (scaled + 255.0)) / (255.0 * (259.0 - scaled));
    if !factor.is_finite() {
        return Err(OpsError::InvalidParameter(format!(
            "contrast amount {amount} produces a non-finite factor"
        )));
    }
    Ok(factor)
}

/// Applies contrast around [`CONTRAST_PIVOT`] to every pixel.
///
/// # Example
///
/// ```rust
/// use coverlift_core::PixelBuffer;
/// use coverlift_ops::tone::contrast;
///
/// let gray = PixelBuffer::filled(10, 10, [128, 128, 128, 255]);
/// assert_eq!(contrast(gray.clone(), 0.2).unwrap(), gray);
/// ```
pub fn contrast(mut img: PixelBuffer, amount: f32) -> OpsResult<PixelBuffer> {
    if amount == 0.0 {
        return Ok(img);
    }
    let factor = contrast_factor(amount)?;
    trace!(amount, factor, "contrast");

    img.as_raw_mut().par_chunks_mut(CHANNELS).for_each(|px| {
        for v in &mut px[..COLOR_CHANNELS] {
            *v = quantize(factor * (*v as f32 - CONTRAST_PIVOT) + CONTRAST_PIVOT);
        }
    });
    Ok(img)
}

/// Boosts the saturation of muted pixels more than already-saturated ones.
///
/// Positive `amount` increases vibrance. The formula works on the negated
/// amount: for each pixel, with `max = max(r, g, b)` and `avg` the channel
/// mean,
///
/// ```text
/// amt = (|max - avg| * 2 / 255) * -amount
/// c'  = c + (max - c) * amt        for every channel c != max
/// ```
///
/// Channels equal to the maximum are left unchanged.
pub fn vibrance(mut img: PixelBuffer, amount: f32) -> OpsResult<PixelBuffer> {
    if amount == 0.0 {
        return Ok(img);
    }
    if !amount.is_finite() {
        return Err(OpsError::InvalidParameter(format!(
            "vibrance amount must be finite, got {amount}"
        )));
    }
    let adjustment = -amount;
    trace!(amount, adjustment, "vibrance");

    img.as_raw_mut().par_chunks_mut(CHANNELS).for_each(|px| {
        let (r, g, b) = (px[0] as f32, px[1] as f32, px[2] as f32);
        let max = r.max(g).max(b);
        let avg = (r + g + b) / 3.0;
        let amt = ((max - avg).abs() * 2.0 / 255.0) * adjustment;
        for v in &mut px[..COLOR_CHANNELS] {
            let c = *v as f32;
            if c != max {
                *v = quantize(c + (max - c) * amt);
            }
        }
    });
    Ok(img)
}
