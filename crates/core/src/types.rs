//! Wire-facing body types for the enrollment pipeline.
//!
//! These mirror the external schemas consumed and produced by the service.
//! The binary bodies travel as JSON with byte fields encoded as base64
//! strings (see [`base64_bytes`]).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// Pixel coordinate within an image.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

/// Axis-aligned face rectangle given by its two corners.
///
/// A corner missing from the wire deserializes as the zero point, which
/// [`is_valid`](Self::is_valid) treats as unset: a partial box falls back
/// to automatic detection instead of being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(rename = "topLeft", default)]
    pub top_left: Point,
    #[serde(rename = "bottomRight", default)]
    pub bottom_right: Point,
}

impl BoundingBox {
    pub fn new(top_left: (i64, i64), bottom_right: (i64, i64)) -> Self {
        Self {
            top_left: Point {
                x: top_left.0,
                y: top_left.1,
            },
            bottom_right: Point {
                x: bottom_right.0,
                y: bottom_right.1,
            },
        }
    }

    /// Whether a caller-supplied box may be trusted as a face region.
    ///
    /// Zero is treated as "unset": a box is only valid when both corners
    /// were supplied and all four coordinates are non-zero. A legitimate
    /// box touching the top-left corner of the image is therefore
    /// indistinguishable from an unset one and falls back to automatic
    /// detection. Kept for compatibility with the upstream wire
    /// convention.
    pub fn is_valid(&self) -> bool {
        self.top_left.x != 0
            && self.top_left.y != 0
            && self.bottom_right.x != 0
            && self.bottom_right.y != 0
    }
}

// ---------------------------------------------------------------------------
// Enrollment request / response bodies
// ---------------------------------------------------------------------------

/// Inbound enrollment request, parsed from the envelope payload bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollRequest {
    /// Identity to enroll, e.g. a user name.
    pub id: String,

    /// Raw JPEG bytes of the face image.
    #[serde(with = "base64_bytes")]
    pub face: Vec<u8>,

    /// Optional caller-supplied face region hint.
    #[serde(rename = "faceCoordinates", default, skip_serializing_if = "Option::is_none")]
    pub face_coordinates: Option<BoundingBox>,
}

/// Outcome reported in the reply event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollStatus {
    Ok,
    Failed,
}

/// Body of the `enroll-response` reply event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollResponse {
    pub status: EnrollStatus,
    pub message: String,
}

impl EnrollResponse {
    /// Build the success response for an enrolled identity.
    pub fn enrolled(id: &str) -> Self {
        Self {
            status: EnrollStatus::Ok,
            message: format!("{id} enrolled with success"),
        }
    }
}

/// Body of the downstream `insert` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertRequest {
    pub id: String,

    /// Base64 of the little-endian IEEE-754 f32 embedding array.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub embeddings: String,
}

// ---------------------------------------------------------------------------
// Byte fields as base64
// ---------------------------------------------------------------------------

/// Serde adapter encoding `Vec<u8>` fields as standard-alphabet base64
/// strings, matching how the upstream JSON renders binary payloads.
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
