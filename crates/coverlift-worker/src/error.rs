//! Error types for jobs, configuration and the worker handle.

use coverlift_io::IoError;
use coverlift_ops::OpsError;
use thiserror::Error;

/// Coarse failure category of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected before any pixel work.
    Validation,
    /// Input bytes are not a decodable bitmap.
    Decode,
    /// A pipeline stage, option check or the encoder failed.
    Processing,
}

/// Why a job failed. Only the `Display` text crosses the message boundary.
#[derive(Debug, Error)]
pub enum JobError {
    /// Either axis exceeds the configured maximum.
    #[error("image too large: {width}x{height} exceeds the {max}px limit")]
    ImageTooLarge {
        /// Decoded width
        width: u32,
        /// Decoded height
        height: u32,
        /// Per-axis limit
        max: u32,
    },

    /// Input could not be decoded.
    #[error("failed to decode image: {0}")]
    Decode(#[source] IoError),

    /// Options failed validation.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// A filter stage failed.
    #[error("processing failed: {0}")]
    Processing(#[from] OpsError),

    /// The result could not be encoded.
    #[error("failed to encode result: {0}")]
    Encode(#[source] IoError),

    /// The job's thread unwound.
    #[error("processing aborted: {0}")]
    Panicked(String),
}

impl JobError {
    /// Maps the error to its category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            JobError::ImageTooLarge { .. } => ErrorKind::Validation,
            JobError::Decode(_) => ErrorKind::Decode,
            JobError::InvalidOptions(_)
            | JobError::Processing(_)
            | JobError::Encode(_)
            | JobError::Panicked(_) => ErrorKind::Processing,
        }
    }
}

/// Failure to load a JSON config or options file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid JSON for the target type.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors from the [`crate::Worker`] handle itself.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The worker task is gone; the message was not queued.
    #[error("worker is closed")]
    Closed,

    /// The worker task ended abnormally.
    #[error("worker task failed: {0}")]
    Join(String),
}
