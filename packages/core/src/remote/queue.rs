//! Outbound Request Queue
//!
//! Process-wide FIFO dispatcher shared by every remote call (reads, traversal
//! rounds, mutations). Queued tasks are grouped into batches of
//! `batch_size`; tasks inside a batch start at least `min_spacing` apart and
//! run concurrently; the next batch starts `batch_delay` after the previous
//! one has fully settled.
//!
//! A failing or panicking task never affects the other tasks of its batch:
//! each task reports its own result to its own caller.

use crate::remote::error::RemoteError;
use futures::future::BoxFuture;
use std::future::Future;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, warn};

type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Batching and rate-limit settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Maximum number of tasks dispatched together
    pub batch_size: usize,
    /// Pause after a batch settles before the next one starts
    pub batch_delay: Duration,
    /// Minimum gap between two individual dispatches
    pub min_spacing: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            batch_delay: Duration::from_millis(100),
            min_spacing: Duration::from_millis(50),
        }
    }
}

impl QueueConfig {
    /// No delays at all (tests, in-memory stores)
    pub fn immediate(batch_size: usize) -> Self {
        Self {
            batch_size,
            batch_delay: Duration::ZERO,
            min_spacing: Duration::ZERO,
        }
    }
}

/// Handle to the dispatcher task
///
/// Must be created inside a Tokio runtime. The dispatcher stops once every
/// handle has been dropped and the queue has drained.
pub struct RequestQueue {
    sender: mpsc::UnboundedSender<Job>,
    config: QueueConfig,
}

impl RequestQueue {
    pub fn new(config: QueueConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(run_dispatcher(receiver, config.clone()));
        Self { sender, config }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Queue `task` and wait for its output
    pub async fn enqueue<F, Fut, T>(&self, task: F) -> Result<T, RemoteError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (result_tx, result_rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            Box::pin(async move {
                let output = task().await;
                // Caller may have stopped waiting
                let _ = result_tx.send(output);
            })
        });

        self.sender.send(job).map_err(|_| RemoteError::QueueClosed)?;
        result_rx.await.map_err(|_| RemoteError::QueueClosed)
    }
}

async fn run_dispatcher(mut receiver: mpsc::UnboundedReceiver<Job>, config: QueueConfig) {
    let batch_size = config.batch_size.max(1);
    let mut last_dispatch: Option<Instant> = None;

    while let Some(first) = receiver.recv().await {
        let mut batch = vec![first];
        while batch.len() < batch_size {
            match receiver.try_recv() {
                Ok(job) => batch.push(job),
                Err(_) => break,
            }
        }

        debug!("Dispatching batch of {} request(s)", batch.len());

        let mut running = Vec::with_capacity(batch.len());
        for job in batch {
            if let Some(last) = last_dispatch {
                tokio::time::sleep_until(last + config.min_spacing).await;
            }
            last_dispatch = Some(Instant::now());
            running.push(tokio::spawn(job()));
        }

        for handle in running {
            if let Err(e) = handle.await {
                warn!("Queued request task aborted: {}", e);
            }
        }

        if !config.batch_delay.is_zero() {
            tokio::time::sleep(config.batch_delay).await;
        }
    }

    debug!("Request queue drained and closed");
}
