use std::time::{Duration, Instant};

use image::RgbImage;

use crate::{
    capability::{FaceDetector, LandmarkPredictor},
    engine::RecognitionEngine,
    face::{self, BoundingBox},
    gaze, Result,
};

/// How long a multi-face scene may reuse the previous recognition result.
const RECHECK_INTERVAL: Duration = Duration::from_secs(2);

/// Per-frame outcome: every detected face (nearest first), the recognized
/// name of the nearest one (empty while unknown or pending) and whether both
/// of its eyes fixate the camera.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub faces: Vec<BoundingBox>,
    pub name: String,
    pub looking: bool,
}

/// Drives the per-frame flow: detect, order by size, recognize the nearest
/// face, predict its landmarks and classify both eyes.
pub struct FrameAnalyzer {
    detector: Box<dyn FaceDetector>,
    predictor: Box<dyn LandmarkPredictor>,
    engine: RecognitionEngine,
    last_count: usize,
    last_check: Option<Instant>,
    name: String,
}

impl FrameAnalyzer {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        predictor: Box<dyn LandmarkPredictor>,
        engine: RecognitionEngine,
    ) -> Self {
        Self {
            detector,
            predictor,
            engine,
            last_count: 0,
            last_check: None,
            name: String::new(),
        }
    }

    pub fn analyze(&mut self, frame: &RgbImage) -> Result<FrameReport> {
        let faces = self.detector.detect(frame)?;
        if faces.is_empty() {
            self.last_count = 0;
            return Ok(FrameReport {
                faces,
                name: self.name.clone(),
                looking: false,
            });
        }

        let faces = face::order_by_size(faces);
        let nearest = faces[0];

        if self.should_recognize(faces.len()) {
            self.name = self.engine.recognize(frame, &nearest)?;
        }
        self.last_count = faces.len();

        let gray = image::imageops::grayscale(frame);
        let landmarks = self.predictor.landmarks(&gray, &nearest)?;
        let looking = gaze::is_looking_at_camera(&gray, &landmarks.right_eye())
            && gaze::is_looking_at_camera(&gray, &landmarks.left_eye());

        Ok(FrameReport {
            faces,
            name: self.name.clone(),
            looking,
        })
    }

    // Re-run recognition when the face count changes, or periodically while
    // several faces are visible and the nearest one may have swapped.
    fn should_recognize(&mut self, count: usize) -> bool {
        let now = Instant::now();
        let stale = self
            .last_check
            .map_or(true, |at| now - at > RECHECK_INTERVAL);
        if count != self.last_count || (count > 1 && stale) {
            self.last_check = Some(now);
            return true;
        }
        false
    }
}
