use std::ops::Range;

use crate::{Error, Result};

pub const LANDMARK_COUNT: usize = 68;

// dlib 68-point layout
const RIGHT_EYE: Range<usize> = 36..42;
const LEFT_EYE: Range<usize> = 42..48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Face region in pixel coordinates. `right > left` and `bottom > top`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingBox {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }
}

/// The 68 facial reference points produced by the landmark predictor, in the
/// predictor's fixed semantic order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandmarkSet([Point; LANDMARK_COUNT]);

impl LandmarkSet {
    pub fn new(points: [Point; LANDMARK_COUNT]) -> Self {
        Self(points)
    }

    pub fn right_eye(&self) -> EyePolygon {
        self.eye(RIGHT_EYE)
    }

    pub fn left_eye(&self) -> EyePolygon {
        self.eye(LEFT_EYE)
    }

    fn eye(&self, range: Range<usize>) -> EyePolygon {
        EyePolygon(
            self.0[range]
                .try_into()
                .expect("eye landmark ranges are six points long"),
        )
    }
}

impl TryFrom<Vec<Point>> for LandmarkSet {
    type Error = Error;

    fn try_from(points: Vec<Point>) -> Result<Self> {
        let count = points.len();
        points.try_into().map(Self).map_err(|_| {
            Error::UnknownError(
                format!("expected {} landmarks, got {}", LANDMARK_COUNT, count).into(),
            )
        })
    }
}

impl std::ops::Deref for LandmarkSet {
    type Target = [Point];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Ordered six-point outline of one eye.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyePolygon(pub [Point; 6]);

impl std::ops::Deref for EyePolygon {
    type Target = [Point];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Moves the largest (nearest) face to index 0. Running-maximum selection,
/// not a sort: the order of the remaining elements is unspecified.
pub fn order_by_size(mut faces: Vec<BoundingBox>) -> Vec<BoundingBox> {
    for i in 1..faces.len() {
        if faces[i].area() > faces[0].area() {
            faces.swap(0, i);
        }
    }
    faces
}
