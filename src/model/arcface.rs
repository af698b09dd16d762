use image::RgbImage;

use super::Embedding;
use crate::{capability::FaceEmbedder, face::BoundingBox, Error, Result};

const INPUT_SIZE: u32 = 112;
const EMBEDDING_DIM: usize = 512;
// symmetric normalization into [-1, 1]
const PIXEL_MEAN: f32 = 127.5;
const PIXEL_STD: f32 = 127.5;

/// ArcFace-style embedding extractor.
///
/// Crops the face region, resizes it to the model's 112x112 input, runs the
/// session and L2-normalizes the 512-dimensional output so Euclidean
/// comparison is scale-free.
pub struct EmbeddingModel {
    session: ort::Session,
}

impl EmbeddingModel {
    // w600k_r50.onnx
    #[tracing::instrument(name = "Initialize embedding model", err)]
    pub fn new(onnx_path: std::path::PathBuf) -> Result<Self> {
        Ok(Self {
            session: super::start_session_from_file(onnx_path)?,
        })
    }

    // (1, 3, 112, 112)
    fn preprocess(frame: &RgbImage, face: &BoundingBox) -> ndarray::Array4<f32> {
        let (frame_w, frame_h) = frame.dimensions();
        let x0 = (face.left.max(0) as u32).min(frame_w.saturating_sub(1));
        let y0 = (face.top.max(0) as u32).min(frame_h.saturating_sub(1));
        let x1 = (face.right.max(0) as u32).min(frame_w);
        let y1 = (face.bottom.max(0) as u32).min(frame_h);
        let width = x1.saturating_sub(x0).max(1);
        let height = y1.saturating_sub(y0).max(1);

        let crop = image::imageops::crop_imm(frame, x0, y0, width, height).to_image();
        let resized = image::imageops::resize(
            &crop,
            INPUT_SIZE,
            INPUT_SIZE,
            image::imageops::FilterType::Triangle,
        );

        let size = INPUT_SIZE as usize;
        let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, size, size));
        for (x, y, pixel) in resized.enumerate_pixels() {
            for channel in 0..3 {
                tensor[[0, channel, y as usize, x as usize]] =
                    (pixel[channel] as f32 - PIXEL_MEAN) / PIXEL_STD;
            }
        }
        tensor
    }
}

impl FaceEmbedder for EmbeddingModel {
    fn embed(&self, frame: &RgbImage, face: &BoundingBox) -> Result<Embedding> {
        let tensor = Self::preprocess(frame, face);

        let outputs = self
            .session
            .run(ort::inputs![tensor].map_err(Error::ModelError)?)
            .map_err(Error::ModelError)?;

        let raw: Vec<f32> = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(Error::ModelError)?
            .iter()
            .copied()
            .collect();
        if raw.len() != EMBEDDING_DIM {
            return Err(Error::UnknownError(
                format!("expected {}-dim embedding, got {}", EMBEDDING_DIM, raw.len()).into(),
            ));
        }

        let norm = raw.iter().map(|v| v * v).sum::<f32>().sqrt();
        let values = if norm > 0. {
            raw.iter().map(|v| v / norm).collect()
        } else {
            raw
        };
        Ok(Embedding::from(values))
    }
}
