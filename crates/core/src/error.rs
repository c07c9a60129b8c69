//! Error taxonomy shared across the enrollment pipeline.

/// Which party is at fault for a failed enrollment.
///
/// The transport layer maps this to an HTTP status class: `Client`
/// becomes a 4xx response, `Server` a 5xx response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Client,
    Server,
}

/// All the ways an enrollment can fail, end to end.
///
/// Worker-side failures (`Detection`, `Face`, `WorkerGone`) travel back to
/// the dispatcher over the job's private reply channel so a failed job can
/// never leave its caller hanging.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnrollError {
    /// The inbound event envelope is not well-formed JSON.
    #[error("failed to decode event envelope: {0}")]
    Decode(String),

    /// The envelope payload does not parse as an enroll request.
    #[error("failed to parse enroll request: {0}")]
    Schema(String),

    /// No face was found: the request carried no usable bounding box and
    /// automatic detection located nothing.
    #[error("no face found in image")]
    Detection,

    /// Image decoding, cropping, or embedding generation failed.
    #[error("face processing failed: {0}")]
    Face(String),

    /// The event bus reported the insert event as undelivered.
    #[error("insert event undelivered: {0}")]
    InsertUndelivered(String),

    /// The insert was delivered but acknowledged neither success nor
    /// failure. Kept distinct from success so broker anomalies surface.
    #[error("insert event produced no acknowledgement")]
    InsertAckMissing,

    /// An outbound body could not be serialized.
    #[error("failed to encode outbound payload: {0}")]
    Encode(String),

    /// The worker exited before delivering a result, or the pool is gone.
    #[error("worker exited before delivering a result")]
    WorkerGone,
}

impl EnrollError {
    /// Classify the failure for the transport boundary.
    ///
    /// Only a malformed envelope is the caller's fault; everything past
    /// envelope decoding is a server-side failure.
    pub fn class(&self) -> ErrorClass {
        match self {
            EnrollError::Decode(_) => ErrorClass::Client,
            _ => ErrorClass::Server,
        }
    }

    /// Stable machine-readable code for error bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            EnrollError::Decode(_) => "DECODE_ERROR",
            EnrollError::Schema(_) => "SCHEMA_ERROR",
            EnrollError::Detection => "DETECTION_FAILURE",
            EnrollError::Face(_) => "FACE_PROCESSING_FAILURE",
            EnrollError::InsertUndelivered(_) => "INSERT_UNDELIVERED",
            EnrollError::InsertAckMissing => "INSERT_ACK_MISSING",
            EnrollError::Encode(_) => "ENCODE_ERROR",
            EnrollError::WorkerGone => "WORKER_GONE",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_envelope_decode_failures_are_client_class() {
        assert_eq!(EnrollError::Decode("bad".into()).class(), ErrorClass::Client);

        for error in [
            EnrollError::Schema("bad".into()),
            EnrollError::Detection,
            EnrollError::Face("crop".into()),
            EnrollError::InsertUndelivered("refused".into()),
            EnrollError::InsertAckMissing,
            EnrollError::Encode("json".into()),
            EnrollError::WorkerGone,
        ] {
            assert_eq!(error.class(), ErrorClass::Server, "{error}");
        }
    }

    #[test]
    fn ack_missing_is_distinct_from_undelivered() {
        assert_ne!(
            EnrollError::InsertAckMissing.code(),
            EnrollError::InsertUndelivered(String::new()).code()
        );
    }
}
