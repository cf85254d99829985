//! DMS configuration

use serde::{Deserialize, Serialize};
use crate::DmsError;

/// DMS configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmsConfig {
    /// EAR below this counts as eyes closed
    pub ear_closed: f32,

    /// EAR below this (and not closed) counts as eyes partially closed
    pub ear_partial: f32,

    /// MAR above this counts as yawning
    pub mar_yawn: f32,

    /// MAR above this escalates a yawn to excessive yawning
    pub mar_alert: f32,

    /// Yaw ratio below this counts as head turned
    pub yaw_left: f32,

    /// Yaw ratio above this counts as head turned
    pub yaw_right: f32,

    /// Consecutive qualifying frames before a label switches to alerting
    pub consecutive_frames_threshold: u32,

    /// Floor for the head yaw denominator
    pub division_epsilon: f32,
}

impl Default for DmsConfig {
    fn default() -> Self {
        Self {
            ear_closed: 0.18,
            ear_partial: 0.22,
            mar_yawn: 0.6,
            mar_alert: 0.8,
            yaw_left: 0.4,
            yaw_right: 2.5,
            consecutive_frames_threshold: 15,
            division_epsilon: 0.001,
        }
    }
}

impl DmsConfig {
    /// Create strict config (fewer frames to trigger)
    pub fn strict() -> Self {
        Self {
            consecutive_frames_threshold: 10,
            ..Default::default()
        }
    }

    /// Create lenient config (more frames to trigger)
    pub fn lenient() -> Self {
        Self {
            consecutive_frames_threshold: 25,
            ..Default::default()
        }
    }

    /// Check threshold ordering and ranges
    pub fn validate(&self) -> Result<(), DmsError> {
        let values = [
            ("ear_closed", self.ear_closed),
            ("ear_partial", self.ear_partial),
            ("mar_yawn", self.mar_yawn),
            ("mar_alert", self.mar_alert),
            ("yaw_left", self.yaw_left),
            ("yaw_right", self.yaw_right),
            ("division_epsilon", self.division_epsilon),
        ];
        if let Some((name, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(DmsError::Config(format!("{} must be finite, got {}", name, value)));
        }

        if self.ear_closed >= self.ear_partial {
            return Err(DmsError::Config(format!(
                "ear_closed ({}) must be below ear_partial ({})",
                self.ear_closed, self.ear_partial
            )));
        }
        if self.mar_yawn > self.mar_alert {
            return Err(DmsError::Config(format!(
                "mar_yawn ({}) must not exceed mar_alert ({})",
                self.mar_yawn, self.mar_alert
            )));
        }
        if self.yaw_left >= self.yaw_right {
            return Err(DmsError::Config(format!(
                "yaw_left ({}) must be below yaw_right ({})",
                self.yaw_left, self.yaw_right
            )));
        }
        if self.consecutive_frames_threshold == 0 {
            return Err(DmsError::Config(
                "consecutive_frames_threshold must be at least 1".into(),
            ));
        }
        if self.division_epsilon <= 0.0 {
            return Err(DmsError::Config(format!(
                "division_epsilon must be positive, got {}",
                self.division_epsilon
            )));
        }

        Ok(())
    }
}
