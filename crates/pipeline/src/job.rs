//! The unit of work handed from the dispatcher to a worker.

use tokio::sync::oneshot;

use enrolld_core::{BoundingBox, EnrollError, FeatureVector};

/// What a worker delivers back on the job's reply channel.
pub type JobResult = Result<FeatureVector, EnrollError>;

/// One face image to process, plus the private channel its result must be
/// delivered on.
///
/// A job is created per inbound request, consumed by exactly one worker,
/// and discarded after the reply is sent. Ownership moves wholly into
/// whichever worker dequeues it; the reply channel is single-use and never
/// shared across jobs.
pub struct Job {
    /// Identity being enrolled; used for log correlation only.
    pub request_id: String,

    /// Raw JPEG bytes of the face image.
    pub image: Vec<u8>,

    /// Optional caller-supplied face region hint. A hint with any zero
    /// coordinate is treated as unset.
    pub bounding_box: Option<BoundingBox>,

    /// Single-use reply channel back to the dispatching caller.
    pub(crate) reply: oneshot::Sender<JobResult>,
}
