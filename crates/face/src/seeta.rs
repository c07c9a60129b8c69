//! Production face processor: SeetaFace detection + projection embedding.

use std::cmp::Ordering;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{DynamicImage, GenericImageView, ImageFormat};
use rustface::ImageData;

use enrolld_core::{BoundingBox, FeatureVector};

use crate::processor::{FaceError, FaceProcessor};
use crate::projection::EmbeddingProjection;

/// SeetaFace frontal detector model, loaded from the model directory.
pub const DETECTOR_MODEL_FILE: &str = "seeta_fd_frontal_v1.0.bin";

/// Embedding projection weights, loaded from the model directory.
pub const PROJECTION_MODEL_FILE: &str = "embedding_projection_v1.f32";

/// Face processor backed by `rustface` detection and a linear projection
/// embedding model.
///
/// Construction loads both model files and is expensive; each worker builds
/// its own instance once at startup and keeps it for the process lifetime.
pub struct SeetaProcessor {
    detector_model: rustface::Model,
    projection: EmbeddingProjection,
}

impl SeetaProcessor {
    /// Load both model files from `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self, FaceError> {
        let detector_path = model_dir.join(DETECTOR_MODEL_FILE);
        let file = File::open(&detector_path).map_err(|source| FaceError::ModelRead {
            path: detector_path.clone(),
            source,
        })?;
        let detector_model =
            rustface::read_model(BufReader::new(file)).map_err(|e| FaceError::ModelFormat {
                path: detector_path,
                reason: e.to_string(),
            })?;

        let projection = EmbeddingProjection::load(&model_dir.join(PROJECTION_MODEL_FILE))?;

        tracing::info!(model_dir = %model_dir.display(), "Loaded face models");

        Ok(Self {
            detector_model,
            projection,
        })
    }
}

impl FaceProcessor for SeetaProcessor {
    type Image = DynamicImage;

    fn decode_jpeg(&self, bytes: &[u8]) -> Result<DynamicImage, FaceError> {
        decode_jpeg(bytes)
    }

    fn detect_face(&self, image: &DynamicImage) -> Result<BoundingBox, FaceError> {
        let gray = image.to_luma8();
        let (width, height) = gray.dimensions();

        // The rustface detector is stateful across calls, so a fresh one is
        // built per detection from the shared model data.
        let mut detector = rustface::create_detector_with_model(self.detector_model.clone());
        detector.set_min_face_size(20);
        detector.set_score_thresh(2.0);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&ImageData::new(gray.as_raw(), width, height));

        let best = faces
            .iter()
            .max_by(|a, b| a.score().partial_cmp(&b.score()).unwrap_or(Ordering::Equal))
            .ok_or(FaceError::NoFaceFound)?;

        let bbox = best.bbox();
        let region = BoundingBox::new(
            (i64::from(bbox.x()), i64::from(bbox.y())),
            (
                i64::from(bbox.x()) + i64::from(bbox.width()),
                i64::from(bbox.y()) + i64::from(bbox.height()),
            ),
        );
        tracing::debug!(?region, "Detected face");
        Ok(region)
    }

    fn extract_face(
        &self,
        image: &DynamicImage,
        region: &BoundingBox,
    ) -> Result<DynamicImage, FaceError> {
        extract_region(image, region)
    }

    fn generate_embedding(&self, face: &DynamicImage) -> Result<FeatureVector, FaceError> {
        Ok(self.projection.project(face))
    }
}

/// Decode raw JPEG bytes into a [`DynamicImage`].
pub(crate) fn decode_jpeg(bytes: &[u8]) -> Result<DynamicImage, FaceError> {
    image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .map_err(|e| FaceError::ImageDecode(e.to_string()))
}

/// Crop a face region out of an image, clamping it to the image bounds.
pub(crate) fn extract_region(
    image: &DynamicImage,
    region: &BoundingBox,
) -> Result<DynamicImage, FaceError> {
    let (x, y, width, height) = clamped_region(image.width(), image.height(), region)?;
    Ok(image.crop_imm(x, y, width, height))
}

/// Clamp a region to `width x height`, rejecting boxes with no remaining area.
fn clamped_region(
    width: u32,
    height: u32,
    region: &BoundingBox,
) -> Result<(u32, u32, u32, u32), FaceError> {
    let left = region.top_left.x.clamp(0, i64::from(width));
    let top = region.top_left.y.clamp(0, i64::from(height));
    let right = region.bottom_right.x.clamp(left, i64::from(width));
    let bottom = region.bottom_right.y.clamp(top, i64::from(height));

    if right == left || bottom == top {
        return Err(FaceError::EmptyRegion);
    }

    Ok((
        left as u32,
        top as u32,
        (right - left) as u32,
        (bottom - top) as u32,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{GrayImage, Luma};

    use super::*;

    fn test_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([200])))
    }

    #[test]
    fn decode_rejects_non_jpeg_bytes() {
        let result = decode_jpeg(b"definitely not a jpeg");
        assert!(matches!(result, Err(FaceError::ImageDecode(_))));
    }

    #[test]
    fn decode_accepts_jpeg_bytes() {
        let mut encoded = Cursor::new(Vec::new());
        test_image(32, 24)
            .write_to(&mut encoded, ImageFormat::Jpeg)
            .unwrap();

        let decoded = decode_jpeg(encoded.get_ref()).unwrap();
        assert_eq!(decoded.dimensions(), (32, 24));
    }

    #[test]
    fn extract_crops_an_in_bounds_region() {
        let image = test_image(100, 80);
        let face = extract_region(&image, &BoundingBox::new((10, 20), (50, 60))).unwrap();
        assert_eq!(face.dimensions(), (40, 40));
    }

    #[test]
    fn extract_clamps_overflowing_regions() {
        let image = test_image(100, 80);
        let face = extract_region(&image, &BoundingBox::new((-20, 60), (150, 200))).unwrap();
        assert_eq!(face.dimensions(), (100, 20));
    }

    #[test]
    fn extract_rejects_region_fully_outside_image() {
        let image = test_image(100, 80);
        let result = extract_region(&image, &BoundingBox::new((200, 200), (300, 300)));
        assert!(matches!(result, Err(FaceError::EmptyRegion)));
    }

    #[test]
    fn extract_rejects_inverted_region() {
        let image = test_image(100, 80);
        let result = extract_region(&image, &BoundingBox::new((50, 50), (10, 10)));
        assert!(matches!(result, Err(FaceError::EmptyRegion)));
    }

    #[test]
    fn load_reports_missing_detector_model() {
        let dir = tempfile::tempdir().unwrap();
        let result = SeetaProcessor::load(dir.path());
        assert!(matches!(result, Err(FaceError::ModelRead { .. })));
    }
}
