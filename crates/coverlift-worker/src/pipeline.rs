//! The upscale and restore pipelines.
//!
//! ```text
//! upscale: [denoise] -> resample x scale -> sharpen -> [contrast] -> [vibrance]
//! restore:                                  sharpen
//! ```
//!
//! Each stage reads its input and hands a new buffer to the next; the
//! decoded source is never modified.

use std::borrow::Cow;

use coverlift_core::PixelBuffer;
use coverlift_ops::filter::sharpen_preset;
use coverlift_ops::resize::{resize, scaled_dimensions};
use coverlift_ops::{Filter, OpsError, OpsResult, SharpenPreset, denoise, tone, unsharp};
use tracing::debug;

use crate::config::MAX_OUTPUT_PIXELS;
use crate::{Algorithm, ProcessingOptions};

/// A concrete sharpening step with its parameters resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sharpening {
    /// Gaussian unsharp mask.
    Unsharp {
        /// Gain applied to the detail layer.
        amount: f32,
        /// Blur radius.
        radius: f32,
        /// Minimum absolute difference that gets sharpened.
        threshold: f32,
    },
    /// 3x3 kernel preset.
    Kernel {
        /// Matrix to use.
        preset: SharpenPreset,
        /// Scale applied to the matrix.
        intensity: f32,
    },
}

impl Sharpening {
    /// Parameters used after resampling.
    pub fn for_upscale(algorithm: Algorithm, sharpness: f32) -> Self {
        match algorithm {
            Algorithm::Unsharp => Sharpening::Unsharp {
                amount: sharpness * 0.8,
                radius: 1.2,
                threshold: 2.0,
            },
            Algorithm::Lanczos => Sharpening::Kernel {
                preset: SharpenPreset::Strong,
                intensity: sharpness,
            },
            Algorithm::Bicubic => Sharpening::Kernel {
                preset: SharpenPreset::Standard,
                intensity: sharpness,
            },
        }
    }

    /// Parameters used at native resolution. Unsharp is stronger and tighter
    /// than after an upscale.
    pub fn for_restore(algorithm: Algorithm, sharpness: f32) -> Self {
        match algorithm {
            Algorithm::Unsharp => Sharpening::Unsharp {
                amount: sharpness * 1.2,
                radius: 1.0,
                threshold: 1.0,
            },
            Algorithm::Lanczos => Sharpening::Kernel {
                preset: SharpenPreset::Strong,
                intensity: sharpness,
            },
            Algorithm::Bicubic => Sharpening::Kernel {
                preset: SharpenPreset::Standard,
                intensity: sharpness,
            },
        }
    }

    /// Runs the step.
    pub fn apply(&self, src: &PixelBuffer) -> OpsResult<PixelBuffer> {
        match *self {
            Sharpening::Unsharp {
                amount,
                radius,
                threshold,
            } => unsharp::unsharp_mask(src, amount, radius, threshold),
            Sharpening::Kernel { preset, intensity } => sharpen_preset(src, preset, intensity),
        }
    }
}

/// Composes filter stages into the two pipelines.
#[derive(Debug, Clone, Copy)]
pub struct Orchestrator {
    filter: Filter,
    max_output_pixels: u64,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(Filter::default())
    }
}

impl Orchestrator {
    /// Orchestrator resampling with `filter`.
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            max_output_pixels: MAX_OUTPUT_PIXELS,
        }
    }

    /// Caps the pixel count of an upscale result.
    pub fn with_max_output_pixels(mut self, max: u64) -> Self {
        self.max_output_pixels = max;
        self
    }

    /// Resampling filter in use.
    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Denoise, resample by `options.scale`, sharpen, then tone.
    pub fn upscale(&self, src: &PixelBuffer, options: &ProcessingOptions) -> OpsResult<PixelBuffer> {
        let base = match options.pre_process.denoise_strength() {
            Some(strength) => denoise::denoise(src, strength)?,
            None => Cow::Borrowed(src),
        };

        let (w, h) = scaled_dimensions(base.width(), base.height(), options.scale)?;
        if w as u64 * h as u64 > self.max_output_pixels {
            return Err(OpsError::InvalidDimensions(format!(
                "upscaled size {w}x{h} exceeds the {} pixel output limit",
                self.max_output_pixels
            )));
        }
        debug!(from = ?base.dimensions(), to = ?(w, h), filter = ?self.filter, "upscale");
        let resized = resize(&base, w, h, self.filter)?;
        drop(base);

        let sharpening = Sharpening::for_upscale(options.algorithm, options.sharpness);
        let mut out = sharpening.apply(&resized)?;
        drop(resized);

        if let Some(amount) = options.post_process.contrast_amount() {
            out = tone::contrast(out, amount)?;
        }
        if let Some(amount) = options.post_process.vibrance_amount() {
            out = tone::vibrance(out, amount)?;
        }
        Ok(out)
    }

    /// Sharpen at native resolution. Pre and post stages do not apply.
    pub fn restore(&self, src: &PixelBuffer, options: &ProcessingOptions) -> OpsResult<PixelBuffer> {
        let sharpening = Sharpening::for_restore(options.algorithm, options.sharpness);
        debug!(size = ?src.dimensions(), ?sharpening, "restore");
        sharpening.apply(src)
    }
}
