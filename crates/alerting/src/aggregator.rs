//! Alert Aggregator Implementation

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Debug;
use tracing::{debug, info};

/// Aggregate driver status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverStatus {
    /// No alert is active
    #[default]
    Safe,
    /// At least one alert is active
    Drowsy,
}

/// Edge of the active set between empty and non-empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertTransition {
    /// First alert activated while the set was empty
    BecameActive,
    /// Last alert deactivated
    BecameInactive,
}

/// Set of currently active alert kinds
///
/// Membership changes are idempotent: activating a kind that is already
/// active, or deactivating one that is not, changes nothing and yields no
/// transition.
#[derive(Debug, Clone)]
pub struct AlertAggregator<K> {
    active: BTreeSet<K>,
}

impl<K: Ord + Clone + Debug> AlertAggregator<K> {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self {
            active: BTreeSet::new(),
        }
    }

    /// Mark an alert kind as active
    pub fn activate(&mut self, kind: K) -> Option<AlertTransition> {
        let was_empty = self.active.is_empty();
        if !self.active.insert(kind.clone()) {
            return None;
        }
        debug!("Alert activated: {:?}", kind);

        if was_empty {
            info!("Alerts became active");
            Some(AlertTransition::BecameActive)
        } else {
            None
        }
    }

    /// Mark an alert kind as inactive
    pub fn deactivate(&mut self, kind: &K) -> Option<AlertTransition> {
        if !self.active.remove(kind) {
            return None;
        }
        debug!("Alert deactivated: {:?}", kind);

        if self.active.is_empty() {
            info!("Alerts became inactive");
            Some(AlertTransition::BecameInactive)
        } else {
            None
        }
    }

    /// Remove every active alert
    pub fn clear(&mut self) -> Option<AlertTransition> {
        if self.active.is_empty() {
            return None;
        }
        self.active.clear();
        info!("Alerts cleared");
        Some(AlertTransition::BecameInactive)
    }

    /// Derive the driver status from the current set
    pub fn driver_status(&self) -> DriverStatus {
        if self.active.is_empty() {
            DriverStatus::Safe
        } else {
            DriverStatus::Drowsy
        }
    }

    /// Check whether a kind is active
    pub fn is_active(&self, kind: &K) -> bool {
        self.active.contains(kind)
    }

    /// Iterate over active kinds
    pub fn active(&self) -> impl Iterator<Item = &K> {
        self.active.iter()
    }

    /// Copy of the active kinds
    pub fn snapshot(&self) -> Vec<K> {
        self.active.iter().cloned().collect()
    }

    /// Number of active kinds
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl<K: Ord + Clone + Debug> Default for AlertAggregator<K> {
    fn default() -> Self {
        Self::new()
    }
}
