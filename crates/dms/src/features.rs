//! Geometric feature extraction from landmark frames

use serde::{Deserialize, Serialize};
use crate::landmarks::{
    LandmarkFrame, INNER_LIPS, LEFT_CHEEK, LEFT_EYE_CORNERS, LEFT_EYE_LIDS, MOUTH_CORNERS,
    NOSE_TIP, RIGHT_CHEEK, RIGHT_EYE_CORNERS, RIGHT_EYE_LIDS,
};

/// Per-frame scalar features
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSet {
    /// Eye aspect ratio (lower = more closed)
    pub ear: f32,
    /// Mouth aspect ratio (higher = more open)
    pub mar: f32,
    /// Nose-to-left-cheek over nose-to-right-cheek (1.0 = centered)
    pub yaw_ratio: f32,
}

impl FeatureSet {
    /// Compute all features for a frame
    pub fn extract(frame: &LandmarkFrame, epsilon: f32) -> Self {
        Self {
            ear: eye_aspect_ratio(frame),
            mar: mouth_aspect_ratio(frame),
            yaw_ratio: head_yaw_ratio(frame, epsilon),
        }
    }
}

fn single_eye_ratio(
    frame: &LandmarkFrame,
    corners: (usize, usize),
    lids: [(usize, usize); 2],
) -> f32 {
    let v1 = frame.distance(lids[0].0, lids[0].1);
    let v2 = frame.distance(lids[1].0, lids[1].1);
    let h = frame.distance(corners.0, corners.1);
    (v1 + v2) / (2.0 * h)
}

/// Mean eye aspect ratio of both eyes
pub fn eye_aspect_ratio(frame: &LandmarkFrame) -> f32 {
    let left = single_eye_ratio(frame, LEFT_EYE_CORNERS, LEFT_EYE_LIDS);
    let right = single_eye_ratio(frame, RIGHT_EYE_CORNERS, RIGHT_EYE_LIDS);
    (left + right) / 2.0
}

/// Inner lip opening over mouth width
pub fn mouth_aspect_ratio(frame: &LandmarkFrame) -> f32 {
    let vertical = frame.distance(INNER_LIPS.0, INNER_LIPS.1);
    let horizontal = frame.distance(MOUTH_CORNERS.0, MOUTH_CORNERS.1);
    vertical / horizontal
}

/// Horizontal head rotation from nose position between the cheeks
///
/// The denominator is floored at `epsilon` so a nose that coincides with the
/// right cheek (extreme pose, occlusion) yields a large finite ratio.
pub fn head_yaw_ratio(frame: &LandmarkFrame, epsilon: f32) -> f32 {
    let nose_x = frame.point(NOSE_TIP).x;
    let left_dist = (nose_x - frame.point(LEFT_CHEEK).x).abs();
    let right_dist = (frame.point(RIGHT_CHEEK).x - nose_x).abs();
    left_dist / right_dist.max(epsilon)
}
