//! Driver state tracking

use serde::{Deserialize, Serialize};
use crate::analysis::DmsAlert;
use crate::hysteresis::{Counter, EyeCounters};

/// Eye classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EyeStatus {
    #[default]
    Open,
    PartiallyClosed,
    Closed,
}

impl EyeStatus {
    /// Alert kinds owned by the eye classifier
    pub const ALERTS: [DmsAlert; 2] = [DmsAlert::EyesClosed, DmsAlert::EyesPartiallyClosed];

    /// Alert this label keeps active, if any
    pub fn alert(&self) -> Option<DmsAlert> {
        match self {
            EyeStatus::Open => None,
            EyeStatus::PartiallyClosed => Some(DmsAlert::EyesPartiallyClosed),
            EyeStatus::Closed => Some(DmsAlert::EyesClosed),
        }
    }
}

/// Mouth classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum YawnStatus {
    #[default]
    Normal,
    Yawning,
}

/// Head orientation classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeadStatus {
    #[default]
    Forward,
    Turned,
}

impl HeadStatus {
    /// Alert kinds owned by the head classifier
    pub const ALERTS: [DmsAlert; 1] = [DmsAlert::HeadNotForward];

    pub fn alert(&self) -> Option<DmsAlert> {
        match self {
            HeadStatus::Forward => None,
            HeadStatus::Turned => Some(DmsAlert::HeadNotForward),
        }
    }
}

/// Read-only view of the hysteresis counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub eye_closed: u32,
    pub eye_partial: u32,
    pub yawn: u32,
    pub head_turned: u32,
}

/// Frame bookkeeping for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// Frames with a detected face
    pub frames_processed: u64,
    /// Frames skipped because no face was detected
    pub frames_skipped: u64,
}

/// Driver state (tracked over time)
#[derive(Debug, Clone, Default)]
pub struct DriverState {
    /// Eye closed / partially closed counters
    pub eyes: EyeCounters,

    /// Consecutive frames with mouth open past the yawn threshold
    pub yawn: Counter,

    /// Consecutive frames with head outside the forward band
    pub head_turned: Counter,

    pub stats: SessionStats,
}

impl DriverState {
    pub fn counters(&self) -> CounterSnapshot {
        CounterSnapshot {
            eye_closed: self.eyes.closed.count(),
            eye_partial: self.eyes.partial.count(),
            yawn: self.yawn.count(),
            head_turned: self.head_turned.count(),
        }
    }

    /// Reset state (on monitoring stop or driver change)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
