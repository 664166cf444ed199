//! Messages exchanged with the worker.
//!
//! Both directions are tagged unions whose JSON form is:
//!
//! ```text
//! in:  { "type": "PROCESS_IMAGE", "jobId": "...", "payload": { "file": [..], "options": {..} } }
//! out: { "type": "PROGRESS", "jobId": "...", "progress": 30 }
//!      { "type": "COMPLETE", "jobId": "...", "result": [..] }
//!      { "type": "ERROR",    "jobId": "...", "error": "..." }
//! ```
//!
//! Byte buffers move through the channels by value; nothing is shared
//! between the caller and the job.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProcessingOptions;

/// Caller-chosen, opaque job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Wraps an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Body of a `PROCESS_IMAGE` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// Encoded input image.
    pub file: Vec<u8>,
    /// How to process it.
    #[serde(default)]
    pub options: ProcessingOptions,
}

/// Requests accepted by the worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Inbound {
    /// Process one image.
    ProcessImage {
        /// Echoed on every reply.
        job_id: JobId,
        /// Input and options.
        payload: Payload,
    },
}

impl Inbound {
    /// Builds a `PROCESS_IMAGE` request.
    pub fn process_image(
        job_id: impl Into<JobId>,
        file: Vec<u8>,
        options: ProcessingOptions,
    ) -> Self {
        Inbound::ProcessImage {
            job_id: job_id.into(),
            payload: Payload { file, options },
        }
    }

    /// Id of the job this request starts.
    pub fn job_id(&self) -> &JobId {
        match self {
            Inbound::ProcessImage { job_id, .. } => job_id,
        }
    }
}

/// Replies emitted by the worker.
///
/// Per job: zero or more `Progress`, then exactly one `Complete` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Outbound {
    /// Milestone reached, percent in `0..=100`.
    Progress {
        /// Job the milestone belongs to.
        job_id: JobId,
        /// Percent done.
        progress: u8,
    },
    /// Job finished; `result` is the PNG-encoded output.
    Complete {
        /// Finished job.
        job_id: JobId,
        /// Encoded image.
        result: Vec<u8>,
    },
    /// Job failed; only the message text is kept.
    Error {
        /// Failed job.
        job_id: JobId,
        /// Human-readable reason.
        error: String,
    },
}

impl Outbound {
    /// A progress milestone.
    pub fn progress(job_id: &JobId, progress: u8) -> Self {
        Outbound::Progress {
            job_id: job_id.clone(),
            progress: progress.min(100),
        }
    }

    /// A failure, keeping only the error's `Display` text.
    pub fn error(job_id: &JobId, error: impl fmt::Display) -> Self {
        Outbound::Error {
            job_id: job_id.clone(),
            error: error.to_string(),
        }
    }

    /// Job this message refers to.
    pub fn job_id(&self) -> &JobId {
        match self {
            Outbound::Progress { job_id, .. }
            | Outbound::Complete { job_id, .. }
            | Outbound::Error { job_id, .. } => job_id,
        }
    }

    /// True for `Complete` and `Error`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outbound::Progress { .. })
    }
}

/// One unit of work, unpacked from an [`Inbound`] request.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Caller's id.
    pub id: JobId,
    /// Encoded input image, owned for the job's lifetime.
    pub input: Vec<u8>,
    /// Processing options.
    pub options: ProcessingOptions,
}

impl From<Inbound> for Job {
    fn from(msg: Inbound) -> Self {
        match msg {
            Inbound::ProcessImage { job_id, payload } => Job {
                id: job_id,
                input: payload.file,
                options: payload.options,
            },
        }
    }
}
