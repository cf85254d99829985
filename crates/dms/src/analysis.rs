//! DMS analysis results and alerts

use std::fmt;
use alerting::{AlertTransition, DriverStatus};
use serde::{Deserialize, Serialize};
use crate::features::FeatureSet;
use crate::state::{EyeStatus, HeadStatus, YawnStatus};

/// DMS alert types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DmsAlert {
    /// Eyes closed for the configured number of frames
    EyesClosed,

    /// Eyes narrowed for the configured number of frames
    EyesPartiallyClosed,

    /// Mouth open past the yawn threshold
    YawningDetected,

    /// Mouth open past the alert threshold while yawning
    ExcessiveYawning,

    /// Head turned away from the camera
    HeadNotForward,
}

impl DmsAlert {
    /// Human readable label
    pub fn message(&self) -> &'static str {
        match self {
            DmsAlert::EyesClosed => "Eyes Closed",
            DmsAlert::EyesPartiallyClosed => "Eyes Partially Closed",
            DmsAlert::YawningDetected => "Yawning Detected",
            DmsAlert::ExcessiveYawning => "Excessive Yawning",
            DmsAlert::HeadNotForward => "Head Not Forward",
        }
    }
}

impl fmt::Display for DmsAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Membership change of a single alert kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "edge", content = "alert", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertEdge {
    Activated(DmsAlert),
    Deactivated(DmsAlert),
}

/// Complete DMS analysis result for one processed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmsAnalysis {
    /// Sequence number among processed frames (1-based)
    pub frame: u64,

    #[serde(flatten)]
    pub features: FeatureSet,

    pub eye_status: EyeStatus,
    pub yawn_status: YawnStatus,
    pub head_status: HeadStatus,

    /// SAFE iff no alert is active
    pub driver_status: DriverStatus,

    /// Active alerts, ordered
    pub active_alerts: Vec<DmsAlert>,

    /// Alert kinds that changed membership on this frame
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub alert_edges: Vec<AlertEdge>,

    /// Active set went empty <-> non-empty on this frame
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub transition: Option<AlertTransition>,
}

impl DmsAnalysis {
    /// Check if any alerts are active
    pub fn has_alerts(&self) -> bool {
        !self.active_alerts.is_empty()
    }

    /// Active alerts joined for display
    pub fn alert_summary(&self, separator: &str) -> String {
        self.active_alerts
            .iter()
            .map(DmsAlert::message)
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Result of feeding one detector output into a session
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// No face detected; counters frozen
    Skipped,
    Processed(DmsAnalysis),
}

impl FrameOutcome {
    pub fn analysis(&self) -> Option<&DmsAnalysis> {
        match self {
            FrameOutcome::Skipped => None,
            FrameOutcome::Processed(analysis) => Some(analysis),
        }
    }

    pub fn into_analysis(self) -> Option<DmsAnalysis> {
        match self {
            FrameOutcome::Skipped => None,
            FrameOutcome::Processed(analysis) => Some(analysis),
        }
    }
}
