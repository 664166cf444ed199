//! Worker-wide settings.
//!
//! Loaded once, shared by every job the worker runs. Fields absent from a
//! config file keep their defaults:
//!
//! ```json
//! { "maxDimension": 4096, "queueCapacity": 16,
//!   "maxOutputPixels": 67108864,
//!   "resampleFilter": "bicubic", "pngCompression": "balanced" }
//! ```

use std::path::Path;

use coverlift_io::png::Compression;
use coverlift_ops::Filter;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Largest accepted width or height, in pixels.
pub const MAX_DIMENSION: u32 = 4096;

/// Largest upscale result, in pixels: a maximum-size input at 2x.
pub const MAX_OUTPUT_PIXELS: u64 = 8192 * 8192;

/// Default depth of the inbound job queue.
pub const QUEUE_CAPACITY: usize = 16;

/// Settings shared by all jobs of one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorkerConfig {
    /// Per-axis size gate applied before decoding.
    pub max_dimension: u32,
    /// Upper bound on `width * height` of an upscale result.
    pub max_output_pixels: u64,
    /// Jobs buffered before `submit` waits.
    pub queue_capacity: usize,
    /// Resampling filter for upscale.
    pub resample_filter: Filter,
    /// Deflate effort for the PNG result.
    pub png_compression: Compression,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_dimension: MAX_DIMENSION,
            max_output_pixels: MAX_OUTPUT_PIXELS,
            queue_capacity: QUEUE_CAPACITY,
            resample_filter: Filter::Bicubic,
            png_compression: Compression::Balanced,
        }
    }
}

impl WorkerConfig {
    /// Reads a config from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// True if a `width x height` image passes the size gate.
    #[inline]
    pub fn admits(&self, width: u32, height: u32) -> bool {
        width <= self.max_dimension && height <= self.max_dimension
    }
}
