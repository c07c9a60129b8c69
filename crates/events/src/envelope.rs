//! The `{ "payload": <bytes> }` indirection around binary bodies.
//!
//! Inbound events and the reply event both wrap their actual body in this
//! envelope, with the payload bytes base64-encoded in JSON. Parsing
//! failures split into two classes: a malformed envelope is the caller's
//! fault ([`EnrollError::Decode`]), while payload bytes that do not parse
//! as the expected schema are a server-side failure
//! ([`EnrollError::Schema`]).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use enrolld_core::types::base64_bytes;
use enrolld_core::EnrollError;

/// JSON envelope carrying an opaque byte payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(with = "base64_bytes")]
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Wrap a body by serializing it into the payload bytes.
    pub fn wrap<T: Serialize>(body: &T) -> Result<Self, EnrollError> {
        let payload = serde_json::to_vec(body).map_err(|e| EnrollError::Encode(e.to_string()))?;
        Ok(Self { payload })
    }

    /// Parse the envelope itself from raw event data.
    pub fn parse(bytes: &[u8]) -> Result<Self, EnrollError> {
        serde_json::from_slice(bytes).map_err(|e| EnrollError::Decode(e.to_string()))
    }

    /// Parse the payload bytes as a typed body.
    pub fn open<T: DeserializeOwned>(&self) -> Result<T, EnrollError> {
        serde_json::from_slice(&self.payload).map_err(|e| EnrollError::Schema(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use enrolld_core::{EnrollRequest, EnrollResponse, EnrollStatus};

    #[test]
    fn wrap_then_open_round_trips_a_body() {
        let request = EnrollRequest {
            id: "alice".into(),
            face: vec![1, 2, 3],
            face_coordinates: None,
        };

        let envelope = Envelope::wrap(&request).unwrap();
        let back: EnrollRequest = envelope.open().unwrap();

        assert_eq!(back.id, "alice");
        assert_eq!(back.face, vec![1, 2, 3]);
    }

    #[test]
    fn payload_travels_as_base64_in_json() {
        let envelope = Envelope {
            payload: vec![0xff, 0x00],
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["payload"], "/wA=");
    }

    #[test]
    fn malformed_envelope_is_a_decode_error() {
        let result = Envelope::parse(b"{not json");
        assert_matches!(result, Err(EnrollError::Decode(_)));
    }

    #[test]
    fn malformed_payload_is_a_schema_error() {
        let envelope = Envelope {
            payload: b"{\"wrong\": true}".to_vec(),
        };
        let result: Result<EnrollRequest, _> = envelope.open();
        assert_matches!(result, Err(EnrollError::Schema(_)));
    }

    #[test]
    fn response_bodies_wrap_like_requests() {
        let response = EnrollResponse::enrolled("bob");
        let envelope = Envelope::wrap(&response).unwrap();

        let back: EnrollResponse = envelope.open().unwrap();
        assert_eq!(back.status, EnrollStatus::Ok);
        assert_eq!(back.message, "bob enrolled with success");
    }
}
