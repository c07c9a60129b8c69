//! The versioned event wrapper consumed and produced by the service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use enrolld_core::EnrollError;

/// Event format version emitted by this service.
pub const SPEC_VERSION: &str = "1.0";

/// Source attribute stamped on every outbound event.
pub const EVENT_SOURCE: &str = "enroller";

/// Type tag of the downstream storage event.
pub const TYPE_INSERT: &str = "insert";

/// Type tag of the reply event.
pub const TYPE_ENROLL_RESPONSE: &str = "enroll-response";

/// A single event on the bus.
///
/// Constructed via [`Event::new`] and enriched with
/// [`with_data`](Event::with_data), mirroring how the bus frames
/// deliveries: version, type tag, source, unique id, timestamp, and a
/// JSON data section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "specversion")]
    pub spec_version: String,

    #[serde(rename = "type")]
    pub event_type: String,

    pub source: String,

    /// Unique event id.
    pub id: String,

    /// When the event was created (UTC).
    pub time: DateTime<Utc>,

    /// Event-specific JSON body.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Event {
    /// Create a new event of the given type, sourced from this service.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            spec_version: SPEC_VERSION.into(),
            event_type: event_type.into(),
            source: EVENT_SOURCE.into(),
            id: uuid::Uuid::new_v4().to_string(),
            time: Utc::now(),
            data: serde_json::Value::Object(Default::default()),
        }
    }

    /// Set the data section from any serializable body.
    pub fn with_data<T: Serialize>(mut self, data: &T) -> Result<Self, EnrollError> {
        self.data = serde_json::to_value(data).map_err(|e| EnrollError::Encode(e.to_string()))?;
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
