//! Linear projection model producing the face embedding.
//!
//! The recognition model file is a flat array of `EMBEDDING_DIM x PATCH_AREA`
//! little-endian f32 weights. A cropped face is reduced to a normalized
//! `PATCH_SIZE x PATCH_SIZE` grayscale patch, projected through the weight
//! matrix, and L2-normalized into the final [`FeatureVector`].

use std::fs;
use std::path::Path;

use image::imageops::FilterType;
use image::DynamicImage;

use enrolld_core::{FeatureVector, EMBEDDING_DIM};

use crate::processor::FaceError;

/// Side length of the grayscale input patch.
pub const PATCH_SIZE: u32 = 16;

/// Number of inputs to the projection (`PATCH_SIZE` squared).
pub const PATCH_AREA: usize = (PATCH_SIZE * PATCH_SIZE) as usize;

/// Expected model file size in bytes.
const MODEL_BYTES: usize = EMBEDDING_DIM * PATCH_AREA * 4;

/// Row-major `EMBEDDING_DIM x PATCH_AREA` projection matrix.
pub struct EmbeddingProjection {
    weights: Vec<f32>,
}

impl EmbeddingProjection {
    /// Load the projection weights from a model file.
    pub fn load(path: &Path) -> Result<Self, FaceError> {
        let bytes = fs::read(path).map_err(|source| FaceError::ModelRead {
            path: path.to_path_buf(),
            source,
        })?;

        if bytes.len() != MODEL_BYTES {
            return Err(FaceError::ModelFormat {
                path: path.to_path_buf(),
                reason: format!("expected {MODEL_BYTES} bytes, got {}", bytes.len()),
            });
        }

        let weights = bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        Ok(Self { weights })
    }

    /// Build a projection from in-memory weights. Used by tests.
    pub fn from_weights(weights: Vec<f32>) -> Result<Self, FaceError> {
        if weights.len() != EMBEDDING_DIM * PATCH_AREA {
            return Err(FaceError::ModelFormat {
                path: "<memory>".into(),
                reason: format!(
                    "expected {} weights, got {}",
                    EMBEDDING_DIM * PATCH_AREA,
                    weights.len()
                ),
            });
        }
        Ok(Self { weights })
    }

    /// Project a cropped face into the embedding space.
    pub fn project(&self, face: &DynamicImage) -> FeatureVector {
        let patch = image::imageops::resize(
            &face.to_luma8(),
            PATCH_SIZE,
            PATCH_SIZE,
            FilterType::Triangle,
        );

        let inputs: Vec<f32> = patch.pixels().map(|p| f32::from(p.0[0]) / 255.0).collect();

        let mut values = [0.0f32; EMBEDDING_DIM];
        for (row, value) in values.iter_mut().enumerate() {
            let weights = &self.weights[row * PATCH_AREA..(row + 1) * PATCH_AREA];
            *value = weights
                .iter()
                .zip(&inputs)
                .map(|(w, x)| w * x)
                .sum();
        }

        // L2-normalize; an all-black patch yields the zero vector as-is.
        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for value in &mut values {
                *value /= norm;
            }
        }

        FeatureVector::new(values)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use image::{DynamicImage, GrayImage, Luma};

    use super::*;

    fn identity_like_weights() -> Vec<f32> {
        // Row i reads input pixel i * 2, giving distinct, deterministic rows.
        let mut weights = vec![0.0f32; EMBEDDING_DIM * PATCH_AREA];
        for row in 0..EMBEDDING_DIM {
            weights[row * PATCH_AREA + row * 2] = 1.0;
        }
        weights
    }

    fn gradient_face() -> DynamicImage {
        let gray = GrayImage::from_fn(64, 64, |x, y| Luma([((x * 3 + y) % 256) as u8]));
        DynamicImage::ImageLuma8(gray)
    }

    #[test]
    fn projection_is_deterministic() {
        let projection = EmbeddingProjection::from_weights(identity_like_weights()).unwrap();
        let face = gradient_face();

        let first = projection.project(&face);
        let second = projection.project(&face);
        assert_eq!(first, second);
    }

    #[test]
    fn projection_output_is_unit_length() {
        let projection = EmbeddingProjection::from_weights(identity_like_weights()).unwrap();
        let vector = projection.project(&gradient_face());

        let norm = vector.as_slice().iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4, "norm was {norm}");
    }

    #[test]
    fn all_black_patch_projects_to_zero_without_panicking() {
        let projection = EmbeddingProjection::from_weights(identity_like_weights()).unwrap();
        let black = DynamicImage::ImageLuma8(GrayImage::from_pixel(32, 32, Luma([0])));

        let vector = projection.project(&black);
        assert!(vector.as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn wrong_weight_count_is_rejected() {
        let result = EmbeddingProjection::from_weights(vec![0.0; 7]);
        assert!(matches!(result, Err(FaceError::ModelFormat { .. })));
    }

    #[test]
    fn load_rejects_truncated_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projection.f32");
        std::fs::write(&path, [0u8; 16]).unwrap();

        let result = EmbeddingProjection::load(&path);
        assert!(matches!(result, Err(FaceError::ModelFormat { .. })));
    }

    #[test]
    fn load_reads_little_endian_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projection.f32");

        let mut bytes = Vec::with_capacity(EMBEDDING_DIM * PATCH_AREA * 4);
        for _ in 0..EMBEDDING_DIM * PATCH_AREA {
            bytes.extend_from_slice(&0.5f32.to_le_bytes());
        }
        std::fs::write(&path, &bytes).unwrap();

        let projection = EmbeddingProjection::load(&path).unwrap();
        assert_eq!(projection.weights.len(), EMBEDDING_DIM * PATCH_AREA);
        assert!(projection.weights.iter().all(|w| *w == 0.5));
    }

    #[test]
    fn load_reports_missing_file() {
        let result = EmbeddingProjection::load(Path::new("/nonexistent/projection.f32"));
        assert!(matches!(result, Err(FaceError::ModelRead { .. })));
    }
}
