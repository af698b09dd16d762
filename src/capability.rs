use std::io::Write;

use image::{GrayImage, RgbImage};

use crate::{
    face::{BoundingBox, LandmarkSet},
    model::Embedding,
    Error, Result,
};

/// Locates faces in a frame. No ordering guarantee; an empty list is a valid
/// outcome, not an error.
pub trait FaceDetector {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<BoundingBox>>;
}

/// Predicts the 68 facial reference points inside a face box.
pub trait LandmarkPredictor {
    fn landmarks(&mut self, frame: &GrayImage, face: &BoundingBox) -> Result<LandmarkSet>;
}

/// Summarizes a face region into an identity embedding.
pub trait FaceEmbedder: Send + Sync {
    fn embed(&self, frame: &RgbImage, face: &BoundingBox) -> Result<Embedding>;
}

/// Blocking, human-facing label source for enrollment sessions.
pub trait LabelProvider: Send + Sync {
    fn prompt_label(&self) -> Result<String>;
}

const NAME_PROMPT: &str = "Write your name: ";

/// Asks for the label on the controlling terminal.
pub struct StdinLabelProvider;

impl LabelProvider for StdinLabelProvider {
    fn prompt_label(&self) -> Result<String> {
        let mut stdout = std::io::stdout();
        stdout
            .write_all(NAME_PROMPT.as_bytes())
            .map_err(Error::as_unknown_error)?;
        stdout.flush().map_err(Error::as_unknown_error)?;

        let mut line = String::new();
        std::io::stdin()
            .read_line(&mut line)
            .map_err(Error::as_unknown_error)?;
        Ok(line.trim_end().to_string())
    }
}
