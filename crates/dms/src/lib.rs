//! Driver Monitoring System (DMS)
//!
//! Frame-by-frame driver state analysis from facial landmarks:
//! - Eye aspect ratio (eye closure / drowsiness)
//! - Mouth aspect ratio (yawning / fatigue)
//! - Head yaw ratio (inattention)
//! - Debounced per-signal classification and alert aggregation

pub mod analysis;
pub mod config;
pub mod features;
pub mod hysteresis;
pub mod landmarks;
pub mod session;
pub mod state;
#[cfg(any(test, feature = "test-utils"))]
pub mod synthetic;

pub use alerting::{AlertTransition, DriverStatus};
pub use analysis::{AlertEdge, DmsAlert, DmsAnalysis, FrameOutcome};
pub use config::DmsConfig;
pub use features::{eye_aspect_ratio, head_yaw_ratio, mouth_aspect_ratio, FeatureSet};
pub use landmarks::{LandmarkFrame, Point3, CANONICAL_LANDMARK_COUNT};
pub use session::Session;
pub use state::{CounterSnapshot, EyeStatus, HeadStatus, SessionStats, YawnStatus};

use thiserror::Error;

/// DMS error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DmsError {
    #[error("Malformed landmark frame: expected {expected} points, got {actual}")]
    MalformedFrame { expected: usize, actual: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}
