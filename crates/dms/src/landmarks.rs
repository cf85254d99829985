//! Facial landmark frame schema
//!
//! Frames follow the 468-point face-mesh topology. Only the indices below
//! are read by the feature extractors.

use serde::{Deserialize, Serialize};
use crate::DmsError;

/// Number of points in a valid frame
pub const CANONICAL_LANDMARK_COUNT: usize = 468;

/// Left eye: corners and two lid pairs (upper, lower)
pub const LEFT_EYE_CORNERS: (usize, usize) = (33, 133);
pub const LEFT_EYE_LIDS: [(usize, usize); 2] = [(160, 144), (158, 153)];

/// Right eye: corners and two lid pairs (upper, lower)
pub const RIGHT_EYE_CORNERS: (usize, usize) = (362, 263);
pub const RIGHT_EYE_LIDS: [(usize, usize); 2] = [(385, 380), (387, 373)];

/// Inner lips (upper, lower)
pub const INNER_LIPS: (usize, usize) = (13, 14);
/// Mouth corners (left, right)
pub const MOUTH_CORNERS: (usize, usize) = (61, 291);

pub const NOSE_TIP: usize = 1;
pub const LEFT_CHEEK: usize = 234;
pub const RIGHT_CHEEK: usize = 454;

/// Normalized 3D landmark point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in 3D
    pub fn distance(&self, other: &Point3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl From<[f32; 3]> for Point3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Point3> for [f32; 3] {
    fn from(p: Point3) -> Self {
        [p.x, p.y, p.z]
    }
}

/// One frame of facial landmarks
///
/// Always holds exactly [`CANONICAL_LANDMARK_COUNT`] points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point3>", into = "Vec<Point3>")]
pub struct LandmarkFrame {
    points: Vec<Point3>,
}

impl LandmarkFrame {
    /// Wrap a point list, rejecting anything but the canonical length
    pub fn new(points: Vec<Point3>) -> Result<Self, DmsError> {
        if points.len() != CANONICAL_LANDMARK_COUNT {
            return Err(DmsError::MalformedFrame {
                expected: CANONICAL_LANDMARK_COUNT,
                actual: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// Wrap a point list already known to have the canonical length
    #[cfg(any(test, feature = "test-utils"))]
    pub(crate) fn from_canonical(points: [Point3; CANONICAL_LANDMARK_COUNT]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }

    /// Point at a role index
    pub fn point(&self, index: usize) -> &Point3 {
        &self.points[index]
    }

    /// Distance between two role indices
    pub fn distance(&self, a: usize, b: usize) -> f32 {
        self.points[a].distance(&self.points[b])
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Replace a single point
    #[cfg(test)]
    pub(crate) fn set_point(&mut self, index: usize, point: Point3) {
        self.points[index] = point;
    }
}

impl TryFrom<Vec<Point3>> for LandmarkFrame {
    type Error = DmsError;

    fn try_from(points: Vec<Point3>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<LandmarkFrame> for Vec<Point3> {
    fn from(frame: LandmarkFrame) -> Self {
        frame.points
    }
}
