//! Per-job processing options.
//!
//! The wire form is camelCase JSON; every field is optional and falls back
//! to the documented default:
//!
//! ```json
//! {
//!   "mode": "upscale",
//!   "scale": 2,
//!   "sharpness": 1.0,
//!   "algorithm": "unsharp",
//!   "preProcess": { "denoise": true, "denoiseStrength": 0.3 },
//!   "postProcess": { "contrast": true, "contrastAmount": 0.1,
//!                    "vibrance": true, "vibranceAmount": 0.2 }
//! }
//! ```

use std::path::Path;

use coverlift_ops::tone::contrast_factor;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, JobError};

/// Default upscale factor.
pub const DEFAULT_SCALE: f32 = 2.0;
/// Default sharpening strength.
pub const DEFAULT_SHARPNESS: f32 = 1.0;
/// Denoise strength used when denoising is on but no strength is given.
pub const DEFAULT_DENOISE_STRENGTH: f32 = 0.3;
/// Contrast amount used when contrast is on but no amount is given.
pub const DEFAULT_CONTRAST_AMOUNT: f32 = 0.1;
/// Vibrance amount used when vibrance is on but no amount is given.
pub const DEFAULT_VIBRANCE_AMOUNT: f32 = 0.2;

/// Which pipeline a job runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Sharpen at native resolution.
    Restore,
    /// Denoise, resample, sharpen, tone.
    #[default]
    Upscale,
}

/// Sharpening method. See [`crate::Sharpening`] for the parameters each
/// selects per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// 3x3 `standard` kernel.
    Bicubic,
    /// 3x3 `strong` kernel.
    Lanczos,
    /// Gaussian unsharp mask.
    #[default]
    Unsharp,
}

/// Stages run at native resolution before resampling (upscale only).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreProcess {
    /// Run the adaptive denoiser.
    pub denoise: bool,
    /// Denoise strength, at most 1; [`DEFAULT_DENOISE_STRENGTH`] if unset.
    /// Zero or negative leaves the image untouched.
    pub denoise_strength: Option<f32>,
}

impl PreProcess {
    /// Effective denoise strength, `None` when denoising is off.
    pub fn denoise_strength(&self) -> Option<f32> {
        self.denoise
            .then(|| self.denoise_strength.unwrap_or(DEFAULT_DENOISE_STRENGTH))
    }
}

/// Tone stages run after sharpening (upscale only).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PostProcess {
    /// Apply contrast.
    pub contrast: bool,
    /// Contrast amount; [`DEFAULT_CONTRAST_AMOUNT`] if unset.
    pub contrast_amount: Option<f32>,
    /// Apply vibrance.
    pub vibrance: bool,
    /// Vibrance amount; [`DEFAULT_VIBRANCE_AMOUNT`] if unset.
    pub vibrance_amount: Option<f32>,
}

impl PostProcess {
    /// Effective contrast amount, `None` when contrast is off.
    pub fn contrast_amount(&self) -> Option<f32> {
        self.contrast
            .then(|| self.contrast_amount.unwrap_or(DEFAULT_CONTRAST_AMOUNT))
    }

    /// Effective vibrance amount, `None` when vibrance is off.
    pub fn vibrance_amount(&self) -> Option<f32> {
        self.vibrance
            .then(|| self.vibrance_amount.unwrap_or(DEFAULT_VIBRANCE_AMOUNT))
    }
}

/// Options for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessingOptions {
    /// Pipeline to run. Default: upscale.
    pub mode: Mode,
    /// Upscale factor, `>= 1`. Ignored by restore. Default: 2.
    pub scale: f32,
    /// Sharpening strength. Default: 1.0.
    pub sharpness: f32,
    /// Sharpening method. Default: unsharp.
    pub algorithm: Algorithm,
    /// Native-resolution pre-processing.
    pub pre_process: PreProcess,
    /// Tone post-processing.
    pub post_process: PostProcess,
    /// Accepted for compatibility and ignored: output is always lossless PNG.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<f32>,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            scale: DEFAULT_SCALE,
            sharpness: DEFAULT_SHARPNESS,
            algorithm: Algorithm::default(),
            pre_process: PreProcess::default(),
            post_process: PostProcess::default(),
            quality: None,
        }
    }
}

impl ProcessingOptions {
    /// Restore-mode options with the given sharpening.
    pub fn restore(algorithm: Algorithm, sharpness: f32) -> Self {
        Self {
            mode: Mode::Restore,
            algorithm,
            sharpness,
            ..Self::default()
        }
    }

    /// Upscale-mode options with the given factor and sharpening.
    pub fn upscale(scale: f32, algorithm: Algorithm, sharpness: f32) -> Self {
        Self {
            mode: Mode::Upscale,
            scale,
            algorithm,
            sharpness,
            ..Self::default()
        }
    }

    /// Parses options from their JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads options from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Rejects values the pipelines cannot run with.
    pub fn validate(&self) -> Result<(), JobError> {
        if self.mode == Mode::Upscale && !(self.scale.is_finite() && self.scale >= 1.0) {
            return Err(JobError::InvalidOptions(format!(
                "scale must be a number >= 1, got {}",
                self.scale
            )));
        }
        if !self.sharpness.is_finite() {
            return Err(JobError::InvalidOptions(format!(
                "sharpness must be finite, got {}",
                self.sharpness
            )));
        }
        if self.mode == Mode::Restore {
            return Ok(());
        }
        if let Some(s) = self.pre_process.denoise_strength() {
            if s.is_nan() || s > 1.0 {
                return Err(JobError::InvalidOptions(format!(
                    "denoiseStrength must be a number <= 1, got {s}"
                )));
            }
        }
        if let Some(a) = self.post_process.contrast_amount() {
            contrast_factor(a).map_err(|e| JobError::InvalidOptions(e.to_string()))?;
        }
        if let Some(a) = self.post_process.vibrance_amount() {
            if !a.is_finite() {
                return Err(JobError::InvalidOptions(format!(
                    "vibranceAmount must be finite, got {a}"
                )));
            }
        }
        Ok(())
    }
}
