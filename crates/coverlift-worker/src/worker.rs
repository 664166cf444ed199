//! Async worker handle.
//!
//! A single tokio task drains a bounded queue of [`Inbound`] requests and
//! runs each on the blocking pool, one at a time in arrival order. Replies
//! arrive on the receiver returned by [`Worker::spawn`].
//!
//! ```rust,no_run
//! use coverlift_worker::{Inbound, Outbound, ProcessingOptions, Worker, WorkerConfig};
//!
//! # async fn example(file: Vec<u8>) -> Result<(), coverlift_worker::WorkerError> {
//! let (worker, mut replies) = Worker::spawn(WorkerConfig::default());
//! worker
//!     .submit(Inbound::process_image("cover", file, ProcessingOptions::default()))
//!     .await?;
//!
//! while let Some(msg) = replies.recv().await {
//!     if let Outbound::Progress { progress, .. } = &msg {
//!         println!("{progress}%");
//!     }
//!     if msg.is_terminal() {
//!         break;
//!     }
//! }
//! worker.shutdown().await
//! # }
//! ```

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::{
    BitmapLedger, Dispatcher, Inbound, Job, JobError, Outbound, ProgressSink, WorkerConfig,
    WorkerError,
};

/// Forwards messages to the worker's outbound channel.
struct ChannelSink(mpsc::UnboundedSender<Outbound>);

impl ProgressSink for ChannelSink {
    fn emit(&mut self, msg: Outbound) {
        // A dropped receiver means nobody is listening; the job still runs to completion.
        let _ = self.0.send(msg);
    }
}

/// Handle to a running worker task.
#[derive(Debug)]
pub struct Worker {
    inbound: mpsc::Sender<Inbound>,
    task: JoinHandle<()>,
    ledger: BitmapLedger,
}

impl Worker {
    /// Starts a worker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(config: WorkerConfig) -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (in_tx, in_rx) = mpsc::channel(config.queue_capacity.max(1));
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let ledger = BitmapLedger::new();
        let dispatcher = Dispatcher::with_ledger(config, ledger.clone());

        let task = tokio::spawn(run(dispatcher, in_rx, out_tx));
        let worker = Self {
            inbound: in_tx,
            task,
            ledger,
        };
        (worker, out_rx)
    }

    /// Queues a request, waiting while the queue is full.
    pub async fn submit(&self, msg: Inbound) -> Result<(), WorkerError> {
        self.inbound.send(msg).await.map_err(|_| WorkerError::Closed)
    }

    /// Bitmaps currently decoded by this worker's jobs.
    pub fn ledger(&self) -> &BitmapLedger {
        &self.ledger
    }

    /// Stops accepting requests and waits for queued jobs to finish.
    pub async fn shutdown(self) -> Result<(), WorkerError> {
        drop(self.inbound);
        self.task
            .await
            .map_err(|e| WorkerError::Join(e.to_string()))
    }
}

async fn run(
    dispatcher: Dispatcher,
    mut inbound: mpsc::Receiver<Inbound>,
    outbound: mpsc::UnboundedSender<Outbound>,
) {
    while let Some(msg) = inbound.recv().await {
        let job = Job::from(msg);
        let id = job.id.clone();
        debug!(job_id = %id, bytes = job.input.len(), "job received");

        let d = dispatcher.clone();
        let mut sink = ChannelSink(outbound.clone());
        let res = tokio::task::spawn_blocking(move || d.process(job, &mut sink)).await;

        if let Err(e) = res {
            let reason = if e.is_panic() {
                panic_message(e.into_panic())
            } else {
                e.to_string()
            };
            error!(job_id = %id, %reason, "job aborted");
            let _ = outbound.send(Outbound::error(&id, JobError::Panicked(reason)));
        }
    }
    debug!("inbound closed, worker exiting");
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_owned()
    }
}
