//! Worker loop: dequeue a job, run the face pipeline, deliver the result.

use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, Semaphore};

use enrolld_core::{BoundingBox, EnrollError, FeatureVector};
use enrolld_face::FaceProcessor;

use crate::job::Job;

/// Run one worker until the shared queue closes.
///
/// The worker owns its processor exclusively for its entire lifetime. The
/// mutex around the receiver serializes dequeueing only; jobs are processed
/// with the lock released.
pub(crate) fn run<P: FaceProcessor>(
    id: usize,
    processor: P,
    queue: Arc<Mutex<mpsc::Receiver<Job>>>,
    ready: Arc<Semaphore>,
) {
    tracing::info!(worker = id, "Worker ready");

    loop {
        // Advertise readiness before parking on the queue; submitters
        // consume one permit per handed-off job.
        ready.add_permits(1);

        let job = {
            let mut queue = queue
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            queue.blocking_recv()
        };

        let Some(job) = job else { break };
        process(&processor, id, job);
    }

    tracing::debug!(worker = id, "Queue closed, worker exiting");
}

/// Process one job and deliver its outcome on the reply channel.
///
/// Every exit path sends either the embedding or an error; the reply
/// channel is never left unread by a live worker.
fn process<P: FaceProcessor>(processor: &P, worker: usize, job: Job) {
    let Job {
        request_id,
        image,
        bounding_box,
        reply,
    } = job;

    let result = run_face_pipeline(processor, &image, bounding_box.as_ref());
    match &result {
        Ok(_) => tracing::debug!(worker, request_id = %request_id, "Embedding generated"),
        Err(e) => tracing::warn!(worker, request_id = %request_id, error = %e, "Job failed"),
    }

    if reply.send(result).is_err() {
        tracing::warn!(worker, request_id = %request_id, "Caller went away before result delivery");
    }
}

/// Decode, locate, crop, embed. All intermediates are owned values dropped
/// at scope exit, on success and error paths alike.
fn run_face_pipeline<P: FaceProcessor>(
    processor: &P,
    image: &[u8],
    hint: Option<&BoundingBox>,
) -> Result<FeatureVector, EnrollError> {
    let decoded = processor.decode_jpeg(image)?;

    // The caller's hint is only trusted when all four coordinates are
    // non-zero; anything else falls back to automatic detection.
    let region = match hint {
        Some(hint) if hint.is_valid() => *hint,
        _ => processor.detect_face(&decoded)?,
    };

    let face = processor.extract_face(&decoded, &region)?;
    processor.generate_embedding(&face).map_err(Into::into)
}
