//! Synchronous job execution.
//!
//! [`Dispatcher::process`] runs one job start to finish on the calling
//! thread and reports through a [`ProgressSink`]:
//!
//! | Milestone | When |
//! |-----------|------|
//! | 5  | job accepted |
//! | 15 | bitmap decoded (size gate passed) |
//! | 30 | upscale pipeline starting |
//! | 50 | restore pipeline starting |
//! | 90 | pixels done, encoding |
//!
//! A job that fails the size gate reports only `5` before its error.

use std::time::Instant;

use coverlift_io::decode::probe_dimensions;
use coverlift_io::png;
use tracing::{debug, info, warn};

use crate::{
    BitmapLedger, DecodedBitmap, Inbound, Job, JobError, JobId, Mode, Orchestrator, Outbound,
    ProcessingOptions, WorkerConfig,
};

/// Job accepted.
pub const PROGRESS_ACCEPTED: u8 = 5;
/// Bitmap decoded.
pub const PROGRESS_DECODED: u8 = 15;
/// Upscale pipeline starting.
pub const PROGRESS_UPSCALE: u8 = 30;
/// Restore pipeline starting.
pub const PROGRESS_RESTORE: u8 = 50;
/// Processing done, encoding.
pub const PROGRESS_ENCODING: u8 = 90;

/// Destination for a job's outbound messages.
pub trait ProgressSink {
    /// Delivers one message.
    fn emit(&mut self, msg: Outbound);
}

impl ProgressSink for Vec<Outbound> {
    fn emit(&mut self, msg: Outbound) {
        self.push(msg);
    }
}

/// Runs jobs against a fixed [`WorkerConfig`].
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: WorkerConfig,
    orchestrator: Orchestrator,
    ledger: BitmapLedger,
}

impl Dispatcher {
    /// Dispatcher with its own bitmap ledger.
    pub fn new(config: WorkerConfig) -> Self {
        Self::with_ledger(config, BitmapLedger::new())
    }

    /// Dispatcher recording decoded bitmaps in `ledger`.
    pub fn with_ledger(config: WorkerConfig, ledger: BitmapLedger) -> Self {
        Self {
            config,
            orchestrator: Orchestrator::new(config.resample_filter)
                .with_max_output_pixels(config.max_output_pixels),
            ledger,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Ledger of bitmaps currently decoded by this dispatcher.
    pub fn ledger(&self) -> &BitmapLedger {
        &self.ledger
    }

    /// Handles one inbound message.
    pub fn handle<S: ProgressSink>(&self, msg: Inbound, sink: &mut S) {
        self.process(Job::from(msg), sink);
    }

    /// Runs `job`, emitting progress and exactly one terminal message.
    pub fn process<S: ProgressSink>(&self, job: Job, sink: &mut S) {
        let start = Instant::now();
        let Job { id, input, options } = job;

        let outcome = self.execute(&id, &input, &options, sink);
        drop(input);

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(result) => {
                info!(job_id = %id, elapsed_ms, bytes = result.len(), "job complete");
                sink.emit(Outbound::Complete { job_id: id, result });
            }
            Err(e) => {
                warn!(job_id = %id, elapsed_ms, kind = ?e.kind(), error = %e, "job failed");
                sink.emit(Outbound::error(&id, &e));
            }
        }
    }

    fn execute<S: ProgressSink>(
        &self,
        id: &JobId,
        input: &[u8],
        options: &ProcessingOptions,
        sink: &mut S,
    ) -> Result<Vec<u8>, JobError> {
        sink.emit(Outbound::progress(id, PROGRESS_ACCEPTED));

        let (width, height) = probe_dimensions(input).map_err(JobError::Decode)?;
        if !self.config.admits(width, height) {
            return Err(JobError::ImageTooLarge {
                width,
                height,
                max: self.config.max_dimension,
            });
        }

        let bitmap = DecodedBitmap::decode(input, &self.ledger).map_err(JobError::Decode)?;
        sink.emit(Outbound::progress(id, PROGRESS_DECODED));
        debug!(job_id = %id, width, height, mode = ?options.mode, "decoded");

        options.validate()?;

        let output = match options.mode {
            Mode::Upscale => {
                sink.emit(Outbound::progress(id, PROGRESS_UPSCALE));
                self.orchestrator.upscale(bitmap.pixels(), options)?
            }
            Mode::Restore => {
                sink.emit(Outbound::progress(id, PROGRESS_RESTORE));
                self.orchestrator.restore(bitmap.pixels(), options)?
            }
        };
        drop(bitmap);
        sink.emit(Outbound::progress(id, PROGRESS_ENCODING));

        if let Some(quality) = options.quality {
            debug!(job_id = %id, quality, "quality ignored, output is lossless PNG");
        }
        png::encode(&output, self.config.png_compression).map_err(JobError::Encode)
    }
}
