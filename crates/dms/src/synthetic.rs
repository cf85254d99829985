//! Synthetic landmark frames with prescribed feature values
//!
//! Useful for replaying scripted scenarios through a [`Session`](crate::Session)
//! without a landmark detector.

use crate::landmarks::{
    LandmarkFrame, Point3, CANONICAL_LANDMARK_COUNT, INNER_LIPS, LEFT_CHEEK, LEFT_EYE_CORNERS,
    LEFT_EYE_LIDS, MOUTH_CORNERS, NOSE_TIP, RIGHT_CHEEK, RIGHT_EYE_CORNERS, RIGHT_EYE_LIDS,
};

const EYE_WIDTH: f32 = 0.1;
const EYE_Y: f32 = 0.4;
const MOUTH_WIDTH: f32 = 0.2;
const MOUTH_Y: f32 = 0.7;
const NOSE_X: f32 = 0.5;
const CHEEK_OFFSET: f32 = 0.2;

/// Builder for a frame whose EAR, MAR and yaw ratio match the given values
#[derive(Debug, Clone, Copy)]
pub struct FrameBuilder {
    ear: f32,
    mar: f32,
    yaw_ratio: f32,
}

impl FrameBuilder {
    /// Open eyes, closed mouth, facing forward
    pub fn new() -> Self {
        Self {
            ear: 0.3,
            mar: 0.2,
            yaw_ratio: 1.0,
        }
    }

    pub fn ear(mut self, ear: f32) -> Self {
        self.ear = ear;
        self
    }

    pub fn mar(mut self, mar: f32) -> Self {
        self.mar = mar;
        self
    }

    pub fn yaw_ratio(mut self, yaw_ratio: f32) -> Self {
        self.yaw_ratio = yaw_ratio;
        self
    }

    pub fn build(&self) -> LandmarkFrame {
        let mut points = [Point3::default(); CANONICAL_LANDMARK_COUNT];

        place_eye(&mut points, LEFT_EYE_CORNERS, LEFT_EYE_LIDS, 0.3, self.ear);
        place_eye(&mut points, RIGHT_EYE_CORNERS, RIGHT_EYE_LIDS, 0.6, self.ear);

        let half_open = self.mar * MOUTH_WIDTH / 2.0;
        points[MOUTH_CORNERS.0] = Point3::new(NOSE_X - MOUTH_WIDTH / 2.0, MOUTH_Y, 0.0);
        points[MOUTH_CORNERS.1] = Point3::new(NOSE_X + MOUTH_WIDTH / 2.0, MOUTH_Y, 0.0);
        points[INNER_LIPS.0] = Point3::new(NOSE_X, MOUTH_Y - half_open, 0.0);
        points[INNER_LIPS.1] = Point3::new(NOSE_X, MOUTH_Y + half_open, 0.0);

        points[NOSE_TIP] = Point3::new(NOSE_X, 0.5, -0.05);
        points[RIGHT_CHEEK] = Point3::new(NOSE_X + CHEEK_OFFSET, 0.5, 0.0);
        points[LEFT_CHEEK] = Point3::new(NOSE_X - CHEEK_OFFSET * self.yaw_ratio, 0.5, 0.0);

        LandmarkFrame::from_canonical(points)
    }
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn place_eye(
    points: &mut [Point3],
    corners: (usize, usize),
    lids: [(usize, usize); 2],
    left_x: f32,
    ear: f32,
) {
    let half_open = ear * EYE_WIDTH / 2.0;
    points[corners.0] = Point3::new(left_x, EYE_Y, 0.0);
    points[corners.1] = Point3::new(left_x + EYE_WIDTH, EYE_Y, 0.0);

    for (i, (upper, lower)) in lids.into_iter().enumerate() {
        let x = left_x + EYE_WIDTH * (0.3 + 0.4 * i as f32);
        points[upper] = Point3::new(x, EYE_Y - half_open, 0.0);
        points[lower] = Point3::new(x, EYE_Y + half_open, 0.0);
    }
}
