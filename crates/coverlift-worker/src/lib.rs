//! # coverlift-worker
//!
//! Off-thread image enhancement jobs.
//!
//! A caller submits [`Inbound::ProcessImage`] messages; the worker answers
//! with zero or more [`Outbound::Progress`] messages followed by exactly one
//! terminal [`Outbound::Complete`] or [`Outbound::Error`] per job.
//!
//! ```text
//! Worker (tokio task, bounded inbound queue)
//!    |
//!    v
//! Dispatcher ── probe ── size gate ── decode ── Orchestrator ── PNG encode
//!                                                   |
//!                         denoise -> resample -> sharpen -> contrast -> vibrance
//! ```
//!
//! - [`options`] - [`ProcessingOptions`] and their defaults
//! - [`protocol`] - Message enums and [`Job`]
//! - [`pipeline`] - The upscale and restore pipelines
//! - [`dispatcher`] - Synchronous job execution and progress milestones
//! - [`worker`] - The async single-consumer [`Worker`]
//!
//! # Example
//!
//! ```rust
//! use coverlift_core::PixelBuffer;
//! use coverlift_worker::{Dispatcher, Inbound, Outbound, ProcessingOptions, WorkerConfig};
//!
//! let img = PixelBuffer::filled(10, 10, [200, 10, 10, 255]);
//! let file = coverlift_io::png::encode(&img, Default::default()).unwrap();
//!
//! let dispatcher = Dispatcher::new(WorkerConfig::default());
//! let mut messages: Vec<Outbound> = Vec::new();
//! dispatcher.handle(Inbound::process_image("job-1", file, ProcessingOptions::default()), &mut messages);
//!
//! assert!(matches!(messages.last(), Some(Outbound::Complete { .. })));
//! ```

#![warn(missing_docs)]

pub mod bitmap;
pub mod config;
pub mod dispatcher;
mod error;
pub mod options;
pub mod pipeline;
pub mod protocol;
pub mod worker;

pub use bitmap::{BitmapLedger, DecodedBitmap};
pub use config::WorkerConfig;
pub use dispatcher::{Dispatcher, ProgressSink};
pub use error::{ConfigError, ErrorKind, JobError, WorkerError};
pub use options::{Algorithm, Mode, PostProcess, PreProcess, ProcessingOptions};
pub use pipeline::{Orchestrator, Sharpening};
pub use protocol::{Inbound, Job, JobId, Outbound, Payload};
pub use worker::Worker;
