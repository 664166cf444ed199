//! Image resampling.
//!
//! Separable two-pass resize (horizontal, then vertical) over RGBA8
//! buffers. Every output sample renormalizes its filter weights, so flat
//! regions stay flat at any scale. All four channels are resampled.
//!
//! # Filters
//!
//! - [`Filter::Nearest`] - Fastest, no interpolation (blocky)
//! - [`Filter::Bilinear`] - Linear interpolation (smooth but blurry)
//! - [`Filter::Bicubic`] - Mitchell-Netravali cubic (default)
//! - [`Filter::Lanczos3`] - Sinc-based, sharpest, may ring
//!
//! # Example
//!
//! ```rust
//! use coverlift_core::PixelBuffer;
//! use coverlift_ops::resize::{resize, scaled_dimensions, Filter};
//!
//! let src = PixelBuffer::filled(50, 50, [10, 20, 30, 255]);
//! let (w, h) = scaled_dimensions(50, 50, 2.0).unwrap();
//! let dst = resize(&src, w, h, Filter::Bicubic).unwrap();
//! assert_eq!(dst.dimensions(), (100, 100));
//! ```

use coverlift_core::{CHANNELS, PixelBuffer, quantize};
use rayon::prelude::*;
use tracing::debug;

use crate::{OpsError, OpsResult};

/// Resampling filter for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Filter {
    /// Nearest-neighbor (fastest, no interpolation).
    Nearest,
    /// Bilinear interpolation (smooth, fast).
    Bilinear,
    /// Bicubic interpolation (sharper than bilinear).
    #[default]
    Bicubic,
    /// Lanczos-3 (high quality, sharpest).
    Lanczos3,
}

impl Filter {
    /// Returns the support radius for this filter.
    #[inline]
    pub fn support(&self) -> f32 {
        match self {
            Filter::Nearest => 0.5,
            Filter::Bilinear => 1.0,
            Filter::Bicubic => 2.0,
            Filter::Lanczos3 => 3.0,
        }
    }

    /// Evaluates the filter kernel at position x.
    #[inline]
    pub fn weight(&self, x: f32) -> f32 {
        match self {
            Filter::Nearest => nearest_weight(x),
            Filter::Bilinear => bilinear_weight(x),
            Filter::Bicubic => bicubic_weight(x),
            Filter::Lanczos3 => lanczos_weight(x, 3.0),
        }
    }
}

#[inline]
fn nearest_weight(x: f32) -> f32 {
    if x.abs() <= 0.5 { 1.0 } else { 0.0 }
}

#[inline]
fn bilinear_weight(x: f32) -> f32 {
    let ax = x.abs();
    if ax < 1.0 { 1.0 - ax } else { 0.0 }
}

/// Mitchell-Netravali with B = C = 1/3.
#[inline]
fn bicubic_weight(x: f32) -> f32 {
    const B: f32 = 1.0 / 3.0;
    const C: f32 = 1.0 / 3.0;

    let ax = x.abs();
    if ax < 1.0 {
        ((12.0 - 9.0 * B - 6.0 * C) * ax * ax * ax
            + (-18.0 + 12.0 * B + 6.0 * C) * ax * ax
            + (6.0 - 2.0 * B))
            / 6.0
    } else if ax < 2.0 {
        ((-B - 6.0 * C) * ax * ax * ax
            + (6.0 * B + 30.0 * C) * ax * ax
            + (-12.0 * B - 48.0 * C) * ax
            + (8.0 * B + 24.0 * C))
            / 6.0
    } else {
        0.0
    }
}

#[inline]
fn lanczos_weight(x: f32, a: f32) -> f32 {
    let ax = x.abs();
    if ax < 1e-8 {
        1.0
    } else if ax < a {
        let pi_x = std::f32::consts::PI * ax;
        let pi_x_a = pi_x / a;
        (pi_x.sin() / pi_x) * (pi_x_a.sin() / pi_x_a)
    } else {
        0.0
    }
}

/// Target size for a uniform `scale`: `floor(w * scale) x floor(h * scale)`,
/// never below 1 pixel.
pub fn scaled_dimensions(width: u32, height: u32, scale: f32) -> OpsResult<(u32, u32)> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(OpsError::InvalidParameter(format!(
            "scale must be a positive number, got {scale}"
        )));
    }
    let w = (width as f64 * scale as f64).floor();
    let h = (height as f64 * scale as f64).floor();
    if w > u32::MAX as f64 || h > u32::MAX as f64 {
        return Err(OpsError::InvalidDimensions(format!(
            "{width}x{height} scaled by {scale} overflows"
        )));
    }
    Ok(((w as u32).max(1), (h as u32).max(1)))
}

/// Resizes `src` to `dst_w x dst_h`.
pub fn resize(src: &PixelBuffer, dst_w: u32, dst_h: u32, filter: Filter) -> OpsResult<PixelBuffer> {
    if dst_w == 0 || dst_h == 0 {
        return Err(OpsError::InvalidDimensions(
            "destination size must be > 0".into(),
        ));
    }
    // Validates the allocation before doing any work
    let out_len = PixelBuffer::byte_len(dst_w, dst_h)?;

    let (src_w, src_h) = (src.width() as usize, src.height() as usize);
    debug!(src_w, src_h, dst_w, dst_h, ?filter, "resize");

    let temp = resize_horizontal(src.as_raw(), src_w, src_h, dst_w as usize, filter)?;
    let out = resize_vertical(&temp, dst_w as usize, src_h, dst_h as usize, filter)?;
    debug_assert_eq!(out.len(), out_len);

    Ok(PixelBuffer::from_raw(dst_w, dst_h, out)?)
}

/// Allocates `len` copies of `value`, reporting allocation failure as an error.
fn try_filled<T: Clone>(len: usize, value: T) -> OpsResult<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|e| {
        OpsError::InvalidDimensions(format!("cannot allocate {len} samples: {e}"))
    })?;
    v.resize(len, value);
    Ok(v)
}

fn sample_count(width: usize, height: usize) -> OpsResult<usize> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or_else(|| OpsError::InvalidDimensions(format!("{width}x{height} overflows")))
}

/// Precomputed contributions of source samples to one output sample.
struct Taps {
    start: usize,
    weights: Vec<f32>,
}

fn compute_taps(src_len: usize, dst_len: usize, filter: Filter) -> Vec<Taps> {
    let scale = src_len as f32 / dst_len as f32;
    let stretch = scale.max(1.0);
    let support = filter.support() * stretch;

    (0..dst_len)
        .map(|i| {
            let center = (i as f32 + 0.5) * scale - 0.5;
            let left = ((center - support).floor().max(0.0)) as usize;
            let right = ((center + support).ceil().max(0.0) as usize).min(src_len - 1);
            let left = left.min(right);

            let mut weights: Vec<f32> = (left..=right)
                .map(|s| filter.weight((s as f32 - center) / stretch))
                .collect();
            let sum: f32 = weights.iter().sum();
            if sum.abs() > f32::EPSILON {
                for w in &mut weights {
                    *w /= sum;
                }
            } else {
                // Degenerate window: fall back to the nearest source sample
                let nearest = (center.round().max(0.0) as usize).clamp(left, right);
                weights.iter_mut().for_each(|w| *w = 0.0);
                weights[nearest - left] = 1.0;
            }
            Taps { start: left, weights }
        })
        .collect()
}

/// Horizontal pass: u8 source rows into f32 rows of width `dst_w`.
fn resize_horizontal(
    src: &[u8],
    src_w: usize,
    src_h: usize,
    dst_w: usize,
    filter: Filter,
) -> OpsResult<Vec<f32>> {
    let taps = compute_taps(src_w, dst_w, filter);
    let mut dst = try_filled(sample_count(dst_w, src_h)?, 0.0f32)?;

    dst.par_chunks_mut(dst_w * CHANNELS)
        .enumerate()
        .for_each(|(y, row)| {
            let src_row = &src[y * src_w * CHANNELS..(y + 1) * src_w * CHANNELS];
            for (x, tap) in taps.iter().enumerate() {
                let mut sum = [0.0f32; CHANNELS];
                for (k, &w) in tap.weights.iter().enumerate() {
                    let i = (tap.start + k) * CHANNELS;
                    for c in 0..CHANNELS {
                        sum[c] += src_row[i + c] as f32 * w;
                    }
                }
                row[x * CHANNELS..(x + 1) * CHANNELS].copy_from_slice(&sum);
            }
        });

    Ok(dst)
}

/// Vertical pass: f32 intermediate into quantized u8 output.
fn resize_vertical(
    src: &[f32],
    width: usize,
    src_h: usize,
    dst_h: usize,
    filter: Filter,
) -> OpsResult<Vec<u8>> {
    let taps = compute_taps(src_h, dst_h, filter);
    let mut dst = try_filled(sample_count(width, dst_h)?, 0u8)?;

    dst.par_chunks_mut(width * CHANNELS)
        .zip(taps.par_iter())
        .for_each(|(row, tap)| {
            for x in 0..width {
                let mut sum = [0.0f32; CHANNELS];
                for (k, &w) in tap.weights.iter().enumerate() {
                    let i = ((tap.start + k) * width + x) * CHANNELS;
                    for c in 0..CHANNELS {
                        sum[c] += src[i + c] * w;
                    }
                }
                for c in 0..CHANNELS {
                    row[x * CHANNELS + c] = quantize(sum[c]);
                }
            }
        });

    Ok(dst)
}
