//! Adaptive neighbour-mean denoiser.
//!
//! For every interior pixel and colour channel the mean of the eight
//! surrounding samples is computed. A sample that deviates from that mean
//! by more than `(1 - strength) * 30` is blended toward it:
//!
//! ```text
//! out = value * (1 - strength) + mean * strength
//! ```
//!
//! Samples within the tolerance, the 1-pixel border and alpha are copied.

use std::borrow::Cow;

use coverlift_core::{CHANNELS, PixelBuffer, quantize};
use rayon::prelude::*;
use tracing::trace;

use crate::filter::COLOR_CHANNELS;
use crate::{OpsError, OpsResult};

/// Deviation (in sample units) tolerated at `strength = 0`.
pub const BASE_TOLERANCE: f32 = 30.0;

/// Denoises `src` with `strength` in `[0, 1]`.
///
/// `strength <= 0` returns the input borrowed, without allocating.
///
/// # Example
///
/// ```rust
/// use std::borrow::Cow;
/// use coverlift_core::PixelBuffer;
/// use coverlift_ops::denoise::denoise;
///
/// let img = PixelBuffer::filled(8, 8, [10, 20, 30, 255]);
/// assert!(matches!(denoise(&img, 0.0).unwrap(), Cow::Borrowed(_)));
/// ```
pub fn denoise(src: &PixelBuffer, strength: f32) -> OpsResult<Cow<'_, PixelBuffer>> {
    if strength.is_nan() || strength > 1.0 {
        return Err(OpsError::InvalidParameter(format!(
            "denoise strength must be within [0, 1], got {strength}"
        )));
    }
    if strength <= 0.0 {
        return Ok(Cow::Borrowed(src));
    }

    let width = src.width() as usize;
    let height = src.height() as usize;
    let tolerance = (1.0 - strength) * BASE_TOLERANCE;
    trace!(width, height, strength, tolerance, "denoise");

    let samples = src.as_raw();
    let stride = width * CHANNELS;
    let mut dst = src.clone();

    dst.as_raw_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            if y == 0 || y + 1 >= height {
                return;
            }
            for x in 1..width.saturating_sub(1) {
                let center = y * stride + x * CHANNELS;
                for c in 0..COLOR_CHANNELS {
                    let mut sum = 0.0f32;
                    for dy in [-1isize, 0, 1] {
                        for dx in [-1isize, 0, 1] {
                            if dx == 0 && dy == 0 {
                                continue;
                            }
                            let i = center as isize + dy * stride as isize + dx * CHANNELS as isize;
                            sum += samples[i as usize + c] as f32;
                        }
                    }
                    let mean = sum / 8.0;
                    let value = samples[center + c] as f32;
                    if (value - mean).abs() > tolerance {
                        row[x * CHANNELS + c] = quantize(value * (1.0 - strength) + mean * strength);
                    }
                }
            }
        });

    Ok(Cow::Owned(dst))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_strength_is_identity() {
        let mut img = PixelBuffer::filled(6, 6, [1, 2, 3, 4]);
        img.set_pixel(3, 3, [250, 0, 250, 4]);
        for s in [0.0, -0.5] {
            let out = denoise(&img, s).unwrap();
            assert!(matches!(out, Cow::Borrowed(_)));
            assert_eq!(*out, img);
        }
    }

    #[test]
    fn test_uniform_unchanged() {
        let img = PixelBuffer::filled(100, 100, [255, 0, 0, 255]);
        let out = denoise(&img, 0.5).unwrap();
        assert_eq!(*out, img);
    }

    #[test]
    fn test_outlier_pulled_to_mean() {
        let mut img = PixelBuffer::filled(5, 5, [100, 100, 100, 255]);
        img.set_pixel(2, 2, [200, 100, 100, 255]);
        let out = denoise(&img, 0.5).unwrap();
        // |200 - 100| > 15 -> 200 * 0.5 + 100 * 0.5
        assert_eq!(out.pixel(2, 2), [150, 100, 100, 255]);
        // neighbours see mean 112.5, within tolerance
        assert_eq!(out.pixel(1, 1), [100, 100, 100, 255]);
    }

    #[test]
    fn test_small_deviation_kept() {
        let mut img = PixelBuffer::filled(5, 5, [100, 100, 100, 255]);
        img.set_pixel(2, 2, [110, 100, 100, 255]);
        let out = denoise(&img, 0.3).unwrap();
        assert_eq!(out.pixel(2, 2), [110, 100, 100, 255]);
    }

    #[test]
    fn test_border_untouched() {
        let mut img = PixelBuffer::filled(5, 5, [100, 100, 100, 255]);
        img.set_pixel(0, 2, [255, 255, 255, 255]);
        let out = denoise(&img, 1.0).unwrap();
        assert_eq!(out.pixel(0, 2), [255, 255, 255, 255]);
    }

    #[test]
    fn test_alpha_untouched() {
        let mut img = PixelBuffer::filled(5, 5, [100, 100, 100, 3]);
        img.set_pixel(2, 2, [255, 0, 255, 9]);
        let out = denoise(&img, 0.9).unwrap();
        assert_eq!(out.pixel(2, 2)[3], 9);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let img = PixelBuffer::filled(3, 3, [0, 0, 0, 255]);
        assert!(denoise(&img, 1.5).is_err());
        assert!(denoise(&img, f32::NAN).is_err());
    }
}
