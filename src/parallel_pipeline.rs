// THEORY:
// A single analysis is strictly sequential, but a host often has a whole batch
// of screenshots. The `parallel_pipeline` runs independent analyses side by side
// without sharing any per-run state between them.
//
// Shape:
// - `WorkerPool`: one dispatcher task hands incoming jobs round-robin to N worker
//   tasks. Each job owns its `PixelBuffer` and carries a oneshot sender for its
//   result. Workers run the CPU-bound stages inside `spawn_blocking` so the async
//   runtime keeps serving I/O.
// - `BatchAnalyzer`: decodes each file on a blocking thread and submits it to the
//   pool. At most `worker_count` files are in flight at once, so decoded buffers
//   never pile up in the queue. Results come back in input order, and a file that
//   fails to decode becomes an error entry instead of failing the batch.

use crate::core_modules::pixel_buffer::PixelBuffer;
use crate::error::{Result, VisionError};
use crate::pipeline::{self, AnalysisResult, UiAnalyzer};
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct AnalysisTask {
    pub pixels: PixelBuffer,
    pub result_sender: oneshot::Sender<Result<AnalysisResult>>,
}

pub struct WorkerPool {
    task_sender: mpsc::UnboundedSender<AnalysisTask>,
    dispatcher: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// A pool with one worker per CPU. Must be called inside a Tokio runtime.
    pub fn new(analyzer: UiAnalyzer) -> Self {
        Self::with_workers(analyzer, num_cpus::get())
    }

    /// A pool with `worker_count` workers (at least one). Must be called inside a
    /// Tokio runtime.
    pub fn with_workers(analyzer: UiAnalyzer, worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let analyzer = Arc::new(analyzer);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<AnalysisTask>();

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<AnalysisTask>())
            .unzip();

        // Dispatcher: round-robin over the workers. It ends when every task
        // sender is dropped, which in turn closes the worker channels.
        let dispatcher = tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                if worker_senders[worker_idx].send(task).is_err() {
                    warn!(worker = worker_idx, "worker channel closed; task dropped");
                }
                worker_idx = (worker_idx + 1) % worker_senders.len();
            }
        });

        let workers = worker_receivers
            .into_iter()
            .enumerate()
            .map(|(worker_id, mut worker_receiver)| {
                let analyzer = Arc::clone(&analyzer);
                tokio::spawn(async move {
                    while let Some(task) = worker_receiver.recv().await {
                        let AnalysisTask {
                            pixels,
                            result_sender,
                        } = task;
                        let analyzer = Arc::clone(&analyzer);
                        let outcome =
                            tokio::task::spawn_blocking(move || analyzer.analyze(&pixels))
                                .await
                                .map_err(|e| {
                                    VisionError::Worker(format!(
                                        "worker {worker_id} task failed: {e}"
                                    ))
                                });
                        // The caller may have stopped waiting.
                        let _ = result_sender.send(outcome);
                    }
                    debug!(worker = worker_id, "worker stopped");
                })
            })
            .collect();

        Self {
            task_sender,
            dispatcher,
            workers,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Queues one analysis and waits for its result.
    pub async fn analyze(&self, pixels: PixelBuffer) -> Result<AnalysisResult> {
        let (result_sender, result_receiver) = oneshot::channel();
        self.task_sender
            .send(AnalysisTask {
                pixels,
                result_sender,
            })
            .map_err(|_| VisionError::Worker("failed to send task to worker pool".to_string()))?;

        result_receiver
            .await
            .map_err(|_| VisionError::Worker("failed to receive result from worker".to_string()))?
    }

    /// Stops accepting work and waits for queued jobs to finish.
    pub async fn shutdown(self) {
        drop(self.task_sender);
        let _ = self.dispatcher.await;
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

/// The outcome of one file of a batch.
#[derive(Debug)]
pub struct BatchItem {
    pub path: PathBuf,
    pub result: Result<AnalysisResult>,
}

pub struct BatchAnalyzer {
    pool: WorkerPool,
}

impl BatchAnalyzer {
    pub fn new(analyzer: UiAnalyzer, worker_count: usize) -> Self {
        Self {
            pool: WorkerPool::with_workers(analyzer, worker_count),
        }
    }

    pub fn with_pool(pool: WorkerPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Decodes and analyses every file; results are in input order.
    pub async fn analyze_all(
        &self,
        paths: impl IntoIterator<Item = PathBuf>,
    ) -> Vec<BatchItem> {
        let jobs = paths.into_iter().map(|path| async move {
            let result = match pipeline::load_pixels(&path).await {
                Ok(pixels) => self.pool.analyze(pixels).await,
                Err(e) => Err(e),
            };
            if let Err(e) = &result {
                warn!(path = %path.display(), error = %e, "image skipped");
            }
            BatchItem { path, result }
        });
        stream::iter(jobs)
            .buffered(self.pool.worker_count())
            .collect()
            .await
    }

    /// Analyses already decoded buffers; results are in input order.
    pub async fn analyze_buffers(
        &self,
        buffers: Vec<PixelBuffer>,
    ) -> Vec<Result<AnalysisResult>> {
        stream::iter(buffers.into_iter().map(|pixels| self.pool.analyze(pixels)))
            .buffered(self.pool.worker_count())
            .collect()
            .await
    }

    pub async fn shutdown(self) {
        self.pool.shutdown().await;
    }
}
