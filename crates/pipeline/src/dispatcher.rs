//! Request/response correlation across the worker pool.

use tokio::sync::oneshot;

use enrolld_core::{BoundingBox, EnrollError, FeatureVector};

use crate::job::Job;
use crate::pool::PoolHandle;

/// Bridges the synchronous request-handling flow onto the asynchronous
/// worker pool.
#[derive(Clone)]
pub struct Dispatcher {
    pool: PoolHandle,
}

impl Dispatcher {
    pub fn new(pool: PoolHandle) -> Self {
        Self { pool }
    }

    /// Submit one face job and await its correlated result.
    ///
    /// Every call allocates its own private one-shot reply channel, so
    /// concurrent calls can never cross-deliver no matter how many jobs
    /// are in flight or in which order the workers finish. There is no
    /// timeout: once handed off, a job runs to completion.
    ///
    /// A worker that dies mid-job drops the reply sender, which surfaces
    /// here as [`EnrollError::WorkerGone`] instead of hanging the caller.
    pub async fn dispatch(
        &self,
        request_id: impl Into<String>,
        image: Vec<u8>,
        bounding_box: Option<BoundingBox>,
    ) -> Result<FeatureVector, EnrollError> {
        let (reply, response) = oneshot::channel();
        let job = Job {
            request_id: request_id.into(),
            image,
            bounding_box,
            reply,
        };

        self.pool
            .submit(job)
            .await
            .map_err(|_| EnrollError::WorkerGone)?;

        response.await.map_err(|_| EnrollError::WorkerGone)?
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
