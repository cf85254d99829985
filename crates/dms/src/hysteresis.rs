//! Debounced per-signal classification
//!
//! Every signal uses the same counter rule: a label only switches to its
//! alerting value after `threshold` consecutive qualifying frames, and drops
//! back the moment a frame fails to qualify. Slow to trigger, instant to clear.
//!
//! The ladder functions are pure: they take the prior counters by value and
//! return the new counters along with the label.

use serde::{Deserialize, Serialize};
use crate::analysis::DmsAlert;
use crate::config::DmsConfig;
use crate::state::{EyeStatus, HeadStatus, YawnStatus};

/// Observable state of a single counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterState {
    /// Condition held for this many consecutive frames, below threshold
    Accumulating(u32),
    /// Condition held for at least `threshold` consecutive frames
    Triggered,
}

/// Consecutive-frame counter for one condition branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counter {
    count: u32,
}

impl Counter {
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Advance by one frame
    pub fn step(self, holds: bool, threshold: u32) -> (Counter, CounterState) {
        if !holds {
            return (Counter::default(), CounterState::Accumulating(0));
        }

        let next = Counter {
            count: self.count.saturating_add(1),
        };
        let state = if next.count >= threshold {
            CounterState::Triggered
        } else {
            CounterState::Accumulating(next.count)
        };
        (next, state)
    }

    pub fn is_triggered(&self, threshold: u32) -> bool {
        self.count >= threshold
    }
}

/// Eye counters; at most one is non-zero at any time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EyeCounters {
    pub closed: Counter,
    pub partial: Counter,
}

/// Eye ladder: CLOSED > PARTIALLY_CLOSED > OPEN
pub fn classify_eyes(ear: f32, counters: EyeCounters, config: &DmsConfig) -> (EyeCounters, EyeStatus) {
    let threshold = config.consecutive_frames_threshold;

    if ear < config.ear_closed {
        let (closed, state) = counters.closed.step(true, threshold);
        let status = match state {
            CounterState::Triggered => EyeStatus::Closed,
            CounterState::Accumulating(_) => EyeStatus::Open,
        };
        (EyeCounters { closed, partial: Counter::default() }, status)
    } else if ear < config.ear_partial {
        let (partial, state) = counters.partial.step(true, threshold);
        let status = match state {
            CounterState::Triggered => EyeStatus::PartiallyClosed,
            CounterState::Accumulating(_) => EyeStatus::Open,
        };
        (EyeCounters { closed: Counter::default(), partial }, status)
    } else {
        (EyeCounters::default(), EyeStatus::Open)
    }
}

/// Mouth label plus the alert chosen from the current frame's MAR
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouthOutcome {
    pub status: YawnStatus,
    pub alert: Option<DmsAlert>,
}

impl MouthOutcome {
    /// Alert kinds owned by the mouth classifier
    pub const ALERTS: [DmsAlert; 2] = [DmsAlert::YawningDetected, DmsAlert::ExcessiveYawning];
}

/// Mouth ladder; severity is read at emission time, not counted separately
pub fn classify_mouth(mar: f32, counter: Counter, config: &DmsConfig) -> (Counter, MouthOutcome) {
    let (counter, state) = counter.step(mar > config.mar_yawn, config.consecutive_frames_threshold);

    let outcome = match state {
        CounterState::Triggered => MouthOutcome {
            status: YawnStatus::Yawning,
            alert: Some(if mar > config.mar_alert {
                DmsAlert::ExcessiveYawning
            } else {
                DmsAlert::YawningDetected
            }),
        },
        CounterState::Accumulating(_) => MouthOutcome {
            status: YawnStatus::Normal,
            alert: None,
        },
    };
    (counter, outcome)
}

/// Head ladder: turned when the yaw ratio leaves the forward band
pub fn classify_head(yaw_ratio: f32, counter: Counter, config: &DmsConfig) -> (Counter, HeadStatus) {
    let turned = yaw_ratio < config.yaw_left || yaw_ratio > config.yaw_right;
    let (counter, state) = counter.step(turned, config.consecutive_frames_threshold);

    let status = match state {
        CounterState::Triggered => HeadStatus::Turned,
        CounterState::Accumulating(_) => HeadStatus::Forward,
    };
    (counter, status)
}
