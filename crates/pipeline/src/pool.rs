//! Fixed-size worker pool sharing one job queue.
//!
//! The pool spawns its workers once at process startup and never resizes.
//! Submission is a zero-buffer handoff: a job is only accepted while some
//! worker is parked on the queue, so a burst beyond the pool size blocks
//! the submitters instead of queueing unboundedly. That blocking is the
//! system's only backpressure mechanism.

use std::sync::{Arc, Mutex};
use std::thread;

use tokio::sync::{mpsc, Semaphore};

use enrolld_face::{FaceError, FaceProcessor};

use crate::job::Job;
use crate::worker;

/// Error type for pool lifecycle and submission failures.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// A worker's face processor failed to initialize at startup. The pool
    /// never runs under-strength; this aborts startup entirely.
    #[error("worker {worker} failed to initialize: {source}")]
    Init {
        worker: usize,
        #[source]
        source: FaceError,
    },

    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(std::io::Error),

    /// The pool has been shut down; no more jobs are accepted.
    #[error("worker pool is shut down")]
    Closed,
}

/// Cloneable submission handle onto the pool's shared queue.
///
/// The queue stays open as long as any handle is alive; `shutdown` can only
/// join the workers once every clone has been dropped.
#[derive(Clone, Debug)]
pub struct PoolHandle {
    queue: mpsc::Sender<Job>,
    ready: Arc<Semaphore>,
}

impl PoolHandle {
    /// Hand a job to a worker, suspending until one is ready to take it.
    ///
    /// Ready permits are only issued by workers parked on the queue, which
    /// gives the unbuffered-handoff semantics: `submit` cannot complete
    /// ahead of a worker being free to dequeue.
    pub async fn submit(&self, job: Job) -> Result<(), PoolError> {
        let permit = self.ready.acquire().await.map_err(|_| PoolError::Closed)?;
        permit.forget();
        self.queue.send(job).await.map_err(|_| PoolError::Closed)
    }
}

/// A fixed number of long-lived face-processing workers.
#[derive(Debug)]
pub struct WorkerPool {
    handle: PoolHandle,
    workers: Vec<thread::JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `size` workers, each initializing its own processor via
    /// `factory`.
    ///
    /// Initialization is blocking and happens before the corresponding
    /// thread starts; the first failure aborts startup with
    /// [`PoolError::Init`].
    pub fn start<P, F>(size: usize, mut factory: F) -> Result<Self, PoolError>
    where
        P: FaceProcessor + Send + 'static,
        F: FnMut(usize) -> Result<P, FaceError>,
    {
        assert!(size > 0, "pool size must be at least 1");

        // Capacity `size` keeps sends non-blocking once a ready permit has
        // been acquired; the semaphore is what enforces the handoff.
        let (queue, receiver) = mpsc::channel::<Job>(size);
        let receiver = Arc::new(Mutex::new(receiver));
        let ready = Arc::new(Semaphore::new(0));

        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let processor = factory(id).map_err(|source| PoolError::Init { worker: id, source })?;
            let receiver = Arc::clone(&receiver);
            let ready = Arc::clone(&ready);
            let handle = thread::Builder::new()
                .name(format!("face-worker-{id}"))
                .spawn(move || worker::run(id, processor, receiver, ready))
                .map_err(PoolError::Spawn)?;
            workers.push(handle);
        }

        tracing::info!(size, "Worker pool started");

        Ok(Self {
            handle: PoolHandle { queue, ready },
            workers,
        })
    }

    /// A cloneable submission handle for dispatchers.
    pub fn handle(&self) -> PoolHandle {
        self.handle.clone()
    }

    /// Stop accepting jobs and join the worker threads.
    ///
    /// Closing the ready semaphore fails any submitter still waiting. The
    /// workers themselves exit once the queue closes, which requires every
    /// outstanding [`PoolHandle`] clone to have been dropped first.
    pub fn shutdown(self) {
        let WorkerPool { handle, workers } = self;
        handle.ready.close();
        drop(handle);

        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread had panicked before shutdown");
            }
        }
        tracing::info!("Worker pool stopped");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::testing::StubProcessor;

    #[test]
    fn start_aborts_when_any_worker_fails_to_initialize() {
        let result = WorkerPool::start(3, |id| {
            if id == 1 {
                Err(FaceError::ModelFormat {
                    path: "detector.bin".into(),
                    reason: "corrupt".into(),
                })
            } else {
                Ok(StubProcessor::new())
            }
        });

        assert_matches!(result, Err(PoolError::Init { worker: 1, .. }));
    }

    #[test]
    fn shutdown_joins_all_workers() {
        let stub = StubProcessor::new();
        let pool = WorkerPool::start(4, move |_| Ok(stub.clone())).unwrap();

        // No handles outstanding, so shutdown must return promptly.
        pool.shutdown();
    }
}
