//! Insert dispatch off the request path
//!
//! Accepted transactions are handed to a small pool of tokio workers, each
//! draining its own bounded queue into the shared window. A full queue makes
//! the caller wait for capacity rather than grow memory without bound.
//!
//! An accepted transaction is only promised to be *processed*; a statistics
//! read racing the worker may not see it yet.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use txn_window::{Sample, WindowedAggregator};

use crate::config::WriterConfig;
use crate::metrics::get_metrics;

/// Write path for accepted transactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Queue to the worker pool and return immediately
    #[default]
    Async,
    /// Insert on the caller's task before returning
    Inline,
}

/// Routes samples into the window, inline or through the worker pool
pub struct InsertDispatcher {
    aggregator: Arc<WindowedAggregator>,
    mode: WriteMode,
    senders: Mutex<Vec<mpsc::Sender<Sample>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    next: AtomicUsize,
    inline_fallbacks: AtomicU64,
}

impl InsertDispatcher {
    /// Create a dispatcher and, in async mode, spawn its workers
    ///
    /// Must be called inside a tokio runtime when `mode` is `Async`.
    pub fn new(aggregator: Arc<WindowedAggregator>, config: &WriterConfig) -> Self {
        let mut senders = Vec::new();
        let mut workers = Vec::new();

        if config.mode == WriteMode::Async {
            let worker_count = config.workers.max(1);
            let capacity = config.queue_capacity.max(1);
            for worker_id in 0..worker_count {
                let (tx, rx) = mpsc::channel(capacity);
                senders.push(tx);
                workers.push(tokio::spawn(run_worker(
                    worker_id,
                    rx,
                    Arc::clone(&aggregator),
                )));
            }
            info!(
                workers = worker_count,
                queue_capacity = capacity,
                "Insert worker pool started"
            );
        } else {
            info!("Inserts run inline on the request path");
        }

        Self {
            aggregator,
            mode: config.mode,
            senders: Mutex::new(senders),
            workers: Mutex::new(workers),
            next: AtomicUsize::new(0),
            inline_fallbacks: AtomicU64::new(0),
        }
    }

    /// Dispatcher that always inserts synchronously
    #[must_use]
    pub fn inline(aggregator: Arc<WindowedAggregator>) -> Self {
        Self::new(
            aggregator,
            &WriterConfig {
                mode: WriteMode::Inline,
                ..WriterConfig::default()
            },
        )
    }

    #[must_use]
    pub const fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Hand a sample to the window
    ///
    /// Waits only while the chosen worker's queue is full. If the pool has
    /// already shut down the sample is inserted inline instead of dropped.
    pub async fn dispatch(&self, sample: Sample) {
        let Some(sender) = self.pick_sender() else {
            if self.mode == WriteMode::Async {
                self.fall_back_inline(sample, "Insert worker pool shut down, inserting inline");
            } else {
                self.aggregator.insert_sample(sample);
            }
            return;
        };

        if let Err(mpsc::error::SendError(sample)) = sender.send(sample).await {
            self.fall_back_inline(sample, "Insert worker unavailable, inserting inline");
        }
    }

    /// Async-mode inserts that bypassed the worker pool
    #[must_use]
    pub fn inline_fallbacks(&self) -> u64 {
        self.inline_fallbacks.load(Ordering::Relaxed)
    }

    fn fall_back_inline(&self, sample: Sample, reason: &'static str) {
        warn!("{}", reason);
        self.inline_fallbacks.fetch_add(1, Ordering::Relaxed);
        get_metrics().record_inline_fallback();
        self.aggregator.insert_sample(sample);
    }

    /// Close the queues and wait for every worker to drain
    pub async fn shutdown(&self) {
        let closed = std::mem::take(&mut *self.senders.lock());
        if closed.is_empty() {
            return;
        }
        drop(closed);

        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            if let Err(e) = worker.await {
                error!("Insert worker terminated abnormally: {}", e);
            }
        }
        info!("Insert worker pool drained");
    }

    fn pick_sender(&self) -> Option<mpsc::Sender<Sample>> {
        let senders = self.senders.lock();
        if senders.is_empty() {
            return None;
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % senders.len();
        Some(senders[index].clone())
    }
}

impl std::fmt::Debug for InsertDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsertDispatcher")
            .field("mode", &self.mode)
            .field("workers", &self.senders.lock().len())
            .field("inline_fallbacks", &self.inline_fallbacks())
            .finish()
    }
}

async fn run_worker(
    worker_id: usize,
    mut rx: mpsc::Receiver<Sample>,
    aggregator: Arc<WindowedAggregator>,
) {
    debug!(worker_id, "Insert worker running");
    while let Some(sample) = rx.recv().await {
        aggregator.insert_sample(sample);
    }
    debug!(worker_id, "Insert worker stopped");
}
