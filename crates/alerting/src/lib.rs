//! Alerting System
//!
//! Tracks the set of currently active alert kinds, derives the aggregate
//! driver status, and reports when the set becomes non-empty or empty so
//! that notifiers (audio cue, dashboard) can start or stop.

mod aggregator;

pub use aggregator::{AlertAggregator, AlertTransition, DriverStatus};
