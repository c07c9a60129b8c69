//! The opaque face-processing capability boundary.

use std::io;
use std::path::PathBuf;

use enrolld_core::{BoundingBox, EnrollError, FeatureVector};

/// Error type for face-processing operations.
#[derive(Debug, thiserror::Error)]
pub enum FaceError {
    /// A model file could not be read from disk.
    #[error("failed to read model file {path}: {source}")]
    ModelRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A model file was read but has the wrong shape or encoding.
    #[error("invalid model file {path}: {reason}")]
    ModelFormat { path: PathBuf, reason: String },

    /// The job's image bytes do not decode as a JPEG.
    #[error("failed to decode JPEG image: {0}")]
    ImageDecode(String),

    /// Automatic detection found no face in the image.
    #[error("no face found")]
    NoFaceFound,

    /// The requested face region has no area after clamping to the image.
    #[error("face region is empty after clamping to image bounds")]
    EmptyRegion,
}

impl From<FaceError> for EnrollError {
    fn from(error: FaceError) -> Self {
        match error {
            FaceError::NoFaceFound => EnrollError::Detection,
            other => EnrollError::Face(other.to_string()),
        }
    }
}

/// Capability interface for turning a face image into an embedding.
///
/// All intermediate resources are owned values, so they are released at
/// scope exit on every path, including early error returns. Implementations
/// must be cheap to call but may be expensive to construct; construction
/// happens once per worker at pool startup.
pub trait FaceProcessor {
    /// Decoded in-memory image representation. Opaque to callers.
    type Image;

    /// Decode raw JPEG bytes into an in-memory image.
    fn decode_jpeg(&self, bytes: &[u8]) -> Result<Self::Image, FaceError>;

    /// Locate the most prominent face in a decoded image.
    fn detect_face(&self, image: &Self::Image) -> Result<BoundingBox, FaceError>;

    /// Crop the face region out of a decoded image.
    fn extract_face(
        &self,
        image: &Self::Image,
        region: &BoundingBox,
    ) -> Result<Self::Image, FaceError>;

    /// Produce the fixed-width embedding from a cropped face.
    fn generate_embedding(&self, face: &Self::Image) -> Result<FeatureVector, FaceError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use enrolld_core::ErrorClass;

    #[test]
    fn no_face_maps_to_detection_failure() {
        let error: EnrollError = FaceError::NoFaceFound.into();
        assert!(matches!(error, EnrollError::Detection));
        assert_eq!(error.class(), ErrorClass::Server);
    }

    #[test]
    fn other_failures_map_to_face_processing() {
        let error: EnrollError = FaceError::ImageDecode("truncated".into()).into();
        match error {
            EnrollError::Face(message) => assert!(message.contains("truncated")),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
