//! Fixed-width face embedding and its byte codec.
//!
//! A [`FeatureVector`] is the numeric signature produced from a face image.
//! It is serialized for the downstream insert event as a little-endian
//! IEEE-754 f32 array, then base64-encoded.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::EnrollError;

/// Dimensionality of the face embedding, fixed by the recognition model.
pub const EMBEDDING_DIM: usize = 128;

/// Byte length of the little-endian encoding of one embedding.
pub const EMBEDDING_BYTES: usize = EMBEDDING_DIM * 4;

/// Fixed-length face embedding. Immutable once produced by a worker.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector([f32; EMBEDDING_DIM]);

impl FeatureVector {
    pub fn new(values: [f32; EMBEDDING_DIM]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Encode as a little-endian f32 array.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(EMBEDDING_BYTES);
        for value in &self.0 {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Decode from a little-endian f32 array of exactly [`EMBEDDING_BYTES`].
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self, EnrollError> {
        if bytes.len() != EMBEDDING_BYTES {
            return Err(EnrollError::Encode(format!(
                "embedding must be {EMBEDDING_BYTES} bytes, got {}",
                bytes.len()
            )));
        }

        let mut values = [0.0f32; EMBEDDING_DIM];
        for (value, chunk) in values.iter_mut().zip(bytes.chunks_exact(4)) {
            *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        Ok(Self(values))
    }

    /// Base64 of the little-endian encoding, as carried by the insert event.
    pub fn encode_base64(&self) -> String {
        STANDARD.encode(self.to_le_bytes())
    }

    /// Inverse of [`encode_base64`](Self::encode_base64).
    pub fn decode_base64(encoded: &str) -> Result<Self, EnrollError> {
        let bytes = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| EnrollError::Encode(format!("invalid base64 embedding: {e}")))?;
        Self::from_le_bytes(&bytes)
    }
}

impl From<[f32; EMBEDDING_DIM]> for FeatureVector {
    fn from(values: [f32; EMBEDDING_DIM]) -> Self {
        Self(values)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
