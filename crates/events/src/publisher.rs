//! Downstream delivery of the insert event.

use std::time::Duration;

use enrolld_core::{EnrollError, InsertRequest};

use crate::event::{Event, TYPE_INSERT};

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers the insert event to the configured sink address.
///
/// The outcome is tri-state, and the distinction is load-bearing:
///
/// 1. the bus reports the send as undelivered --
///    [`EnrollError::InsertUndelivered`];
/// 2. the bus returns an acknowledgement event -- success, regardless of
///    the acknowledgement's content;
/// 3. the send went through but no acknowledgement came back --
///    [`EnrollError::InsertAckMissing`]. Collapsing this case into success
///    would mask broker-level anomalies.
///
/// Retries, if any, belong to the transport or the caller; none happen here.
pub struct InsertPublisher {
    client: reqwest::Client,
    sink: String,
}

impl InsertPublisher {
    /// Create a publisher targeting `sink`.
    pub fn new(sink: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            sink: sink.into(),
        }
    }

    /// Publish one insert event and interpret the acknowledgement.
    pub async fn publish(&self, insert: &InsertRequest) -> Result<(), EnrollError> {
        let event = Event::new(TYPE_INSERT).with_data(insert)?;

        let response = self
            .client
            .post(&self.sink)
            .json(&event)
            .send()
            .await
            .map_err(|e| EnrollError::InsertUndelivered(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(sink = %self.sink, %status, "Insert event rejected by sink");
            return Err(EnrollError::InsertUndelivered(format!(
                "sink returned HTTP {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| EnrollError::InsertUndelivered(e.to_string()))?;

        match serde_json::from_slice::<Event>(&body) {
            Ok(ack) => {
                tracing::debug!(ack_type = %ack.event_type, ack_id = %ack.id, "Insert acknowledged");
                Ok(())
            }
            Err(_) => {
                tracing::warn!(sink = %self.sink, "Insert delivered but not acknowledged");
                Err(EnrollError::InsertAckMissing)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
