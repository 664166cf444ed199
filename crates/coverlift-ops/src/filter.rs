//! Gaussian blur and 3x3 kernel convolution.
//!
//! # Kernels
//!
//! - [`GaussianKernel`] - 1-D normalized weights for the separable blur
//! - [`Kernel3x3`] - Fixed sharpening matrices, see [`SharpenPreset`]
//!
//! # Edge handling
//!
//! The two engines treat borders differently:
//!
//! - [`blur`] drops kernel taps that fall outside the image and does **not**
//!   renormalize the remaining weights. Pixels within the kernel half-width
//!   of an edge are therefore pulled toward zero. Downstream stages (the
//!   unsharp mask in particular) depend on this bias, so it is kept.
//! - [`sharpen`] only convolves interior pixels; the 1-pixel border is
//!   copied from the source.
//!
//! # Example
//!
//! ```rust
//! use coverlift_core::PixelBuffer;
//! use coverlift_ops::filter::{blur, sharpen_preset, GaussianKernel, SharpenPreset};
//!
//! let k = GaussianKernel::new(1.2).unwrap();
//! assert_eq!(k.size(), 7);
//!
//! let img = PixelBuffer::filled(16, 16, [40, 80, 120, 255]);
//! let soft = blur(&img, 1.2).unwrap();
//! let crisp = sharpen_preset(&img, SharpenPreset::Strong, 1.0).unwrap();
//! assert_eq!(soft.dimensions(), crisp.dimensions());
//! ```

use coverlift_core::{CHANNELS, PixelBuffer, quantize};
use rayon::prelude::*;
use tracing::trace;

use crate::{OpsError, OpsResult};

/// Channels touched by the filters (alpha is carried through).
pub(crate) const COLOR_CHANNELS: usize = 3;

/// Normalized 1-D Gaussian weights.
///
/// Size is `2 * ceil(2 * radius) + 1`, covering roughly two standard
/// deviations either side of the centre, with `radius` used as sigma.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    radius: f32,
    weights: Vec<f64>,
}

impl GaussianKernel {
    /// Builds the kernel for `radius` (sigma). Weights sum to 1.
    ///
    /// # Example
    ///
    /// ```rust
    /// use coverlift_ops::filter::GaussianKernel;
    ///
    /// let k = GaussianKernel::new(1.0).unwrap();
    /// assert_eq!(k.size(), 5);
    /// assert!((k.sum() - 1.0).abs() < 1e-9);
    /// ```
    pub fn new(radius: f32) -> OpsResult<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(OpsError::InvalidParameter(format!(
                "blur radius must be a positive number, got {radius}"
            )));
        }

        let r = radius as f64;
        let half = (2.0 * r).ceil() as usize;
        let sigma2 = 2.0 * r * r;

        let mut weights: Vec<f64> = (0..=2 * half)
            .map(|i| {
                let x = i as f64 - half as f64;
                (-(x * x) / sigma2).exp()
            })
            .collect();

        let sum: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= sum;
        }

        Ok(Self { radius, weights })
    }

    /// Sigma the kernel was built with.
    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Number of taps (always odd).
    #[inline]
    pub fn size(&self) -> usize {
        self.weights.len()
    }

    /// Taps either side of the centre.
    #[inline]
    pub fn half(&self) -> usize {
        self.weights.len() / 2
    }

    /// Tap weights, leftmost first.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }
}

/// Separable Gaussian blur with `radius` as sigma.
///
/// See the module docs for the edge policy. Alpha is copied through.
pub fn blur(src: &PixelBuffer, radius: f32) -> OpsResult<PixelBuffer> {
    let kernel = GaussianKernel::new(radius)?;
    blur_with_kernel(src, &kernel)
}

/// Separable blur with a prebuilt kernel.
pub fn blur_with_kernel(src: &PixelBuffer, kernel: &GaussianKernel) -> OpsResult<PixelBuffer> {
    let width = src.width() as usize;
    let height = src.height() as usize;
    trace!(width, height, taps = kernel.size(), "blur");

    let weights: Vec<f32> = kernel.weights().iter().map(|&w| w as f32).collect();
    let half = kernel.half() as isize;
    let samples = src.as_raw();

    // Horizontal pass into an f32 RGB intermediate
    let mut temp = vec![0.0f32; width * height * COLOR_CHANNELS];
    temp.par_chunks_mut(width * COLOR_CHANNELS)
        .enumerate()
        .for_each(|(y, row)| {
            let src_row = &samples[y * width * CHANNELS..(y + 1) * width * CHANNELS];
            for x in 0..width {
                let mut sums = [0.0f32; COLOR_CHANNELS];
                for (k, &w) in weights.iter().enumerate() {
                    let sx = x as isize + k as isize - half;
                    if sx < 0 || sx >= width as isize {
                        continue;
                    }
                    let i = sx as usize * CHANNELS;
                    for c in 0..COLOR_CHANNELS {
                        sums[c] += src_row[i + c] as f32 * w;
                    }
                }
                row[x * COLOR_CHANNELS..(x + 1) * COLOR_CHANNELS].copy_from_slice(&sums);
            }
        });

    // Vertical pass over the intermediate; alpha stays as in `src`
    let mut dst = samples.to_vec();
    dst.par_chunks_mut(width * CHANNELS)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                let mut sums = [0.0f32; COLOR_CHANNELS];
                for (k, &w) in weights.iter().enumerate() {
                    let sy = y as isize + k as isize - half;
                    if sy < 0 || sy >= height as isize {
                        continue;
                    }
                    let i = (sy as usize * width + x) * COLOR_CHANNELS;
                    for c in 0..COLOR_CHANNELS {
                        sums[c] += temp[i + c] * w;
                    }
                }
                let o = x * CHANNELS;
                for c in 0..COLOR_CHANNELS {
                    row[o + c] = quantize(sums[c]);
                }
            }
        });

    Ok(PixelBuffer::from_raw(src.width(), src.height(), dst)?)
}

/// Row-major 3x3 convolution matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kernel3x3 {
    /// Weights, top-left first.
    pub weights: [f32; 9],
}

impl Kernel3x3 {
    /// Index of the centre tap.
    pub const CENTER: usize = 4;

    /// Creates a kernel from raw weights.
    pub const fn new(weights: [f32; 9]) -> Self {
        Self { weights }
    }

    /// Scales the kernel by `intensity`.
    ///
    /// The centre becomes `1 + (center - 1) * intensity` and every other
    /// weight is multiplied by `intensity`, so `intensity = 0` is identity
    /// and a kernel summing to 1 keeps summing to 1.
    ///
    /// # Example
    ///
    /// ```rust
    /// use coverlift_ops::filter::SharpenPreset;
    ///
    /// let k = SharpenPreset::Standard.kernel().scaled(0.5);
    /// assert_eq!(k.weights[4], 3.0);
    /// assert_eq!(k.weights[1], -0.5);
    /// ```
    pub fn scaled(&self, intensity: f32) -> Self {
        let mut weights = self.weights;
        for (i, w) in weights.iter_mut().enumerate() {
            if i == Self::CENTER {
                *w = 1.0 + (*w - 1.0) * intensity;
            } else {
                *w *= intensity;
            }
        }
        Self { weights }
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f32 {
        self.weights.iter().sum()
    }
}

/// Named sharpening matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum SharpenPreset {
    /// Centre 1.8, cross -0.2, corners 0.
    Subtle,
    /// Centre 5, cross -1, corners 0.
    #[default]
    Standard,
    /// Centre 9, all eight neighbours -1.
    Strong,
}

impl SharpenPreset {
    /// Unscaled matrix for this preset.
    pub fn kernel(self) -> Kernel3x3 {
        match self {
            SharpenPreset::Subtle => Kernel3x3::new([
                0.0, -0.2, 0.0,
                -0.2, 1.8, -0.2,
                0.0, -0.2, 0.0,
            ]),
            SharpenPreset::Standard => Kernel3x3::new([
                0.0, -1.0, 0.0,
                -1.0, 5.0, -1.0,
                0.0, -1.0, 0.0,
            ]),
            SharpenPreset::Strong => Kernel3x3::new([
                -1.0, -1.0, -1.0,
                -1.0, 9.0, -1.0,
                -1.0, -1.0, -1.0,
            ]),
        }
    }

    /// Lowercase preset name.
    pub fn as_str(self) -> &'static str {
        match self {
            SharpenPreset::Subtle => "subtle",
            SharpenPreset::Standard => "standard",
            SharpenPreset::Strong => "strong",
        }
    }
}

/// Convolves the interior of `src` with `kernel`.
///
/// Only pixels with `1 <= x < width - 1` and `1 <= y < height - 1` are
/// rewritten; the border keeps its source values. Images narrower or
/// shorter than 3 pixels come back unchanged.
pub fn sharpen(src: &PixelBuffer, kernel: &Kernel3x3) -> PixelBuffer {
    let width = src.width() as usize;
    let height = src.height() as usize;
    trace!(width, height, center = kernel.weights[Kernel3x3::CENTER], "sharpen");

    let samples = src.as_raw();
    let k = &kernel.weights;
    let mut dst = src.clone();

    dst.as_raw_mut()
        .par_chunks_mut(width * CHANNELS)
        .enumerate()
        .for_each(|(y, row)| {
            if y == 0 || y + 1 >= height {
                return;
            }
            for x in 1..width.saturating_sub(1) {
                for c in 0..COLOR_CHANNELS {
                    let mut sum = 0.0f32;
                    for ky in 0..3 {
                        let base = ((y + ky - 1) * width + x - 1) * CHANNELS + c;
                        for kx in 0..3 {
                            sum += samples[base + kx * CHANNELS] as f32 * k[ky * 3 + kx];
                        }
                    }
                    row[x * CHANNELS + c] = quantize(sum);
                }
            }
        });

    dst
}

/// Sharpens with a preset scaled by `intensity`.
pub fn sharpen_preset(
    src: &PixelBuffer,
    preset: SharpenPreset,
    intensity: f32,
) -> OpsResult<PixelBuffer> {
    if !intensity.is_finite() {
        return Err(OpsError::InvalidParameter(format!(
            "sharpen intensity must be finite, got {intensity}"
        )));
    }
    Ok(sharpen(src, &preset.kernel().scaled(intensity)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut img = PixelBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = ((x * 37 + y * 91) % 256) as u8;
                img.set_pixel(x, y, [v, 255 - v, v / 2, 200]);
            }
        }
        img
    }

    #[test]
    fn test_gaussian_sizes() {
        assert_eq!(GaussianKernel::new(1.0).unwrap().size(), 5);
        assert_eq!(GaussianKernel::new(1.2).unwrap().size(), 7);
        assert_eq!(GaussianKernel::new(0.3).unwrap().size(), 3);
        assert_eq!(GaussianKernel::new(3.0).unwrap().size(), 13);
    }

    #[test]
    fn test_gaussian_normalized() {
        for r in [0.1f32, 0.5, 1.0, 1.2, 2.7, 10.0, 33.3] {
            let k = GaussianKernel::new(r).unwrap();
            assert!((k.sum() - 1.0).abs() < 1e-6, "radius {r} sums to {}", k.sum());
        }
    }

    #[test]
    fn test_gaussian_shape() {
        let k = GaussianKernel::new(1.5).unwrap();
        let w = k.weights();
        let mid = k.half();
        for i in 0..mid {
            assert_relative_eq!(w[i], w[w.len() - 1 - i], epsilon = 1e-12);
            assert!(w[i] < w[i + 1]);
        }
    }

    #[test]
    fn test_gaussian_rejects_bad_radius() {
        assert!(GaussianKernel::new(0.0).is_err());
        assert!(GaussianKernel::new(-1.0).is_err());
        assert!(GaussianKernel::new(f32::NAN).is_err());
    }

    #[test]
    fn test_blur_flat_interior_unchanged() {
        let img = PixelBuffer::filled(20, 20, [100, 150, 200, 77]);
        let out = blur(&img, 1.0).unwrap();
        // taps reach 2px, so pixels 2px from every edge see the full kernel
        for y in 2..18 {
            for x in 2..18 {
                assert_eq!(out.pixel(x, y), [100, 150, 200, 77]);
            }
        }
    }

    #[test]
    fn test_blur_edge_darkens() {
        let img = PixelBuffer::filled(20, 20, [200, 200, 200, 255]);
        let out = blur(&img, 1.0).unwrap();
        let corner = out.pixel(0, 0);
        let edge = out.pixel(10, 0);
        assert!(corner[0] < edge[0]);
        assert!(edge[0] < 200);
        assert_eq!(corner[3], 255);
    }

    #[test]
    fn test_blur_preserves_alpha() {
        let img = gradient(13, 9);
        let out = blur(&img, 2.0).unwrap();
        for (a, b) in img.pixels().zip(out.pixels()) {
            assert_eq!(a[3], b[3]);
        }
    }

    #[test]
    fn test_blur_smooths_impulse() {
        let mut img = PixelBuffer::filled(11, 11, [0, 0, 0, 255]);
        img.set_pixel(5, 5, [255, 255, 255, 255]);
        let out = blur(&img, 1.0).unwrap();
        assert!(out.pixel(5, 5)[0] < 255);
        assert!(out.pixel(6, 5)[0] > 0);
        assert_eq!(out.pixel(6, 5), out.pixel(4, 5));
        assert_eq!(out.pixel(5, 6), out.pixel(5, 4));
    }

    #[test]
    fn test_kernel_scaling() {
        let k = SharpenPreset::Strong.kernel().scaled(2.0);
        assert_eq!(k.weights[4], 17.0);
        assert_eq!(k.weights[0], -2.0);
        assert_relative_eq!(k.sum(), 1.0);

        let identity = SharpenPreset::Subtle.kernel().scaled(0.0);
        assert_eq!(identity.weights[4], 1.0);
        assert_eq!(identity.sum(), 1.0);
    }

    #[test]
    fn test_presets_sum_to_one() {
        for p in [SharpenPreset::Subtle, SharpenPreset::Standard, SharpenPreset::Strong] {
            assert_relative_eq!(p.kernel().sum(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_sharpen_border_untouched() {
        let img = gradient(12, 10);
        let out = sharpen_preset(&img, SharpenPreset::Strong, 1.0).unwrap();
        for x in 0..12 {
            assert_eq!(out.pixel(x, 0), img.pixel(x, 0));
            assert_eq!(out.pixel(x, 9), img.pixel(x, 9));
        }
        for y in 0..10 {
            assert_eq!(out.pixel(0, y), img.pixel(0, y));
            assert_eq!(out.pixel(11, y), img.pixel(11, y));
        }
        assert_ne!(out, img);
    }

    #[test]
    fn test_sharpen_flat_is_identity() {
        let img = PixelBuffer::filled(8, 8, [33, 66, 99, 255]);
        for p in [SharpenPreset::Subtle, SharpenPreset::Standard, SharpenPreset::Strong] {
            assert_eq!(sharpen_preset(&img, p, 1.0).unwrap(), img);
        }
    }

    #[test]
    fn test_sharpen_clamps() {
        let mut img = PixelBuffer::filled(3, 3, [0, 0, 0, 255]);
        img.set_pixel(1, 1, [255, 128, 10, 255]);
        let out = sharpen_preset(&img, SharpenPreset::Strong, 1.0).unwrap();
        assert_eq!(out.pixel(1, 1), [255, 255, 90, 255]);
    }

    #[test]
    fn test_sharpen_tiny_image() {
        let img = gradient(2, 5);
        assert_eq!(sharpen_preset(&img, SharpenPreset::Standard, 1.0).unwrap(), img);
    }

    #[test]
    fn test_sharpen_rejects_nan_intensity() {
        let img = gradient(4, 4);
        assert!(sharpen_preset(&img, SharpenPreset::Standard, f32::NAN).is_err());
    }
}
