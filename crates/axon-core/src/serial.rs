//! Single-consumer serialized executor.
//!
//! One worker task drains a queue of fallible jobs in submission order. The
//! node registry must never be mutated from arbitrary concurrent tasks;
//! the spot path funnels every node creation through one of these.
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::CoreError;

type SerialJob = Box<dyn FnOnce() -> Result<(), CoreError> + Send + 'static>;

/// Work queue with exactly one consumer and a completion barrier.
///
/// Jobs run strictly in submission order. The first job error stops the
/// worker — jobs still queued behind it are dropped, and the error is what
/// [`SerialExecutor::join`] returns.
pub struct SerialExecutor {
    tx: mpsc::UnboundedSender<SerialJob>,
    worker: JoinHandle<Result<(), CoreError>>,
}

impl SerialExecutor {
    /// Start the worker task.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<SerialJob>();
        let worker = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                job()?;
            }
            Ok(())
        });
        Self { tx, worker }
    }

    /// Enqueue a job.
    ///
    /// A closed queue only happens after a previous job failed; the failure
    /// itself surfaces from [`SerialExecutor::join`].
    pub fn submit<F>(&self, job: F)
    where
        F: FnOnce() -> Result<(), CoreError> + Send + 'static,
    {
        if self.tx.send(Box::new(job)).is_err() {
            debug!("serialized executor is stopped; job dropped");
        }
    }

    /// Completion barrier: wait for every enqueued job, then return the
    /// worker's result.
    pub async fn join(self) -> Result<(), CoreError> {
        drop(self.tx);
        match self.worker.await {
            Ok(result) => result,
            Err(e) => Err(CoreError::Serial(format!("worker task panicked: {e}"))),
        }
    }
}
