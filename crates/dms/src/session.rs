//! Monitoring session
//!
//! Owns all hysteresis counters and the active alert set for one subject.
//! Not safe for concurrent `process_frame` calls; the caller serializes access.

use alerting::{AlertAggregator, AlertTransition, DriverStatus};
use tracing::{debug, info};

use crate::analysis::{AlertEdge, DmsAlert, DmsAnalysis, FrameOutcome};
use crate::config::DmsConfig;
use crate::features::FeatureSet;
use crate::hysteresis::{classify_eyes, classify_head, classify_mouth, MouthOutcome};
use crate::landmarks::LandmarkFrame;
use crate::state::{CounterSnapshot, DriverState, EyeStatus, HeadStatus, SessionStats};
use crate::DmsError;

/// Frame-by-frame drowsiness monitor
pub struct Session {
    config: DmsConfig,
    state: DriverState,
    alerts: AlertAggregator<DmsAlert>,
}

impl Session {
    /// Create a new session with validated configuration
    pub fn new(config: DmsConfig) -> Result<Self, DmsError> {
        config.validate()?;
        info!(
            "Starting DMS session: threshold={} frames, ear_closed={}, ear_partial={}",
            config.consecutive_frames_threshold, config.ear_closed, config.ear_partial
        );
        Ok(Self {
            config,
            state: DriverState::default(),
            alerts: AlertAggregator::new(),
        })
    }

    /// Process one detector output; `None` means no face was detected
    pub fn process_frame(&mut self, frame: Option<&LandmarkFrame>) -> FrameOutcome {
        let Some(frame) = frame else {
            // Missing face is not evidence of recovery: freeze all counters
            self.state.stats.frames_skipped += 1;
            debug!("No face detected, counters frozen");
            return FrameOutcome::Skipped;
        };

        self.state.stats.frames_processed += 1;
        let features = FeatureSet::extract(frame, self.config.division_epsilon);

        let (eyes, eye_status) = classify_eyes(features.ear, self.state.eyes, &self.config);
        let (yawn, mouth) = classify_mouth(features.mar, self.state.yawn, &self.config);
        let (head_turned, head_status) =
            classify_head(features.yaw_ratio, self.state.head_turned, &self.config);

        self.state.eyes = eyes;
        self.state.yawn = yawn;
        self.state.head_turned = head_turned;

        let mut edges = Vec::new();
        collect_edges(&self.alerts, &EyeStatus::ALERTS, eye_status.alert(), &mut edges);
        collect_edges(&self.alerts, &MouthOutcome::ALERTS, mouth.alert, &mut edges);
        collect_edges(&self.alerts, &HeadStatus::ALERTS, head_status.alert(), &mut edges);

        let transition = self.apply_edges(&edges);

        debug!(
            "Frame {}: ear={:.3} mar={:.3} yaw={:.3} eyes={:?} yawn={:?} head={:?}",
            self.state.stats.frames_processed,
            features.ear,
            features.mar,
            features.yaw_ratio,
            eye_status,
            mouth.status,
            head_status
        );

        FrameOutcome::Processed(DmsAnalysis {
            frame: self.state.stats.frames_processed,
            features,
            eye_status,
            yawn_status: mouth.status,
            head_status,
            driver_status: self.alerts.driver_status(),
            active_alerts: self.alerts.snapshot(),
            alert_edges: edges,
            transition,
        })
    }

    /// Activations go first so the set never passes through empty when one
    /// alert replaces another within a frame.
    fn apply_edges(&mut self, edges: &[AlertEdge]) -> Option<AlertTransition> {
        let mut transition = None;
        for edge in edges {
            if let AlertEdge::Activated(kind) = edge {
                info!("Alert raised: {}", kind);
                transition = transition.or(self.alerts.activate(*kind));
            }
        }
        for edge in edges {
            if let AlertEdge::Deactivated(kind) = edge {
                info!("Alert cleared: {}", kind);
                transition = transition.or(self.alerts.deactivate(kind));
            }
        }
        transition
    }

    /// Zero every counter and empty the alert set
    ///
    /// Returns `BecameInactive` if alerts were active. Calling it again is a no-op.
    pub fn reset(&mut self) -> Option<AlertTransition> {
        self.state.reset();
        let transition = self.alerts.clear();
        info!("DMS session reset");
        transition
    }

    pub fn driver_status(&self) -> DriverStatus {
        self.alerts.driver_status()
    }

    pub fn active_alerts(&self) -> Vec<DmsAlert> {
        self.alerts.snapshot()
    }

    pub fn counters(&self) -> CounterSnapshot {
        self.state.counters()
    }

    pub fn stats(&self) -> SessionStats {
        self.state.stats
    }

    pub fn config(&self) -> &DmsConfig {
        &self.config
    }
}

/// Compare one classifier's desired alert with current membership
fn collect_edges(
    alerts: &AlertAggregator<DmsAlert>,
    owned: &[DmsAlert],
    desired: Option<DmsAlert>,
    edges: &mut Vec<AlertEdge>,
) {
    for kind in owned {
        let want = desired == Some(*kind);
        match (want, alerts.is_active(kind)) {
            (true, false) => edges.push(AlertEdge::Activated(*kind)),
            (false, true) => edges.push(AlertEdge::Deactivated(*kind)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::YawnStatus;
    use crate::synthetic::FrameBuilder;
    use proptest::prelude::*;

    fn session() -> Session {
        Session::new(DmsConfig::default()).unwrap()
    }

    fn feed(session: &mut Session, frame: &LandmarkFrame, n: usize) -> Vec<DmsAnalysis> {
        (0..n)
            .filter_map(|_| session.process_frame(Some(frame)).into_analysis())
            .collect()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = DmsConfig {
            consecutive_frames_threshold: 0,
            ..Default::default()
        };
        assert!(Session::new(config).is_err());
    }

    #[test]
    fn test_eyes_closed_triggers_on_frame_15_and_clears_on_16() {
        let mut session = session();
        let closed = FrameBuilder::new().ear(0.10).build();

        let results = feed(&mut session, &closed, 15);
        for analysis in &results[..14] {
            assert_eq!(analysis.eye_status, EyeStatus::Open);
            assert!(analysis.active_alerts.is_empty());
        }
        let last = &results[14];
        assert_eq!(last.eye_status, EyeStatus::Closed);
        assert_eq!(last.active_alerts, vec![DmsAlert::EyesClosed]);
        assert_eq!(last.alert_edges, vec![AlertEdge::Activated(DmsAlert::EyesClosed)]);
        assert_eq!(last.transition, Some(AlertTransition::BecameActive));
        assert_eq!(last.driver_status, DriverStatus::Drowsy);

        let open = FrameBuilder::new().ear(0.50).build();
        let next = session.process_frame(Some(&open)).into_analysis().unwrap();
        assert_eq!(next.eye_status, EyeStatus::Open);
        assert!(next.active_alerts.is_empty());
        assert_eq!(next.alert_edges, vec![AlertEdge::Deactivated(DmsAlert::EyesClosed)]);
        assert_eq!(next.transition, Some(AlertTransition::BecameInactive));
        assert_eq!(next.driver_status, DriverStatus::Safe);
    }

    #[test]
    fn test_no_repeat_edges_while_active() {
        let mut session = session();
        let closed = FrameBuilder::new().ear(0.10).build();

        let results = feed(&mut session, &closed, 20);
        let edge_count: usize = results.iter().map(|a| a.alert_edges.len()).sum();
        assert_eq!(edge_count, 1);
        assert!(results[15..].iter().all(|a| a.transition.is_none()));
    }

    #[test]
    fn test_excessive_yawning() {
        let mut session = session();
        let frame = FrameBuilder::new().mar(0.85).build();

        let last = feed(&mut session, &frame, 15).pop().unwrap();
        assert_eq!(last.yawn_status, YawnStatus::Yawning);
        assert_eq!(last.active_alerts, vec![DmsAlert::ExcessiveYawning]);
    }

    #[test]
    fn test_mild_yawning() {
        let mut session = session();
        let frame = FrameBuilder::new().mar(0.65).build();

        let last = feed(&mut session, &frame, 15).pop().unwrap();
        assert_eq!(last.active_alerts, vec![DmsAlert::YawningDetected]);
    }

    #[test]
    fn test_yawn_severity_swap_keeps_status_drowsy() {
        let mut session = session();
        feed(&mut session, &FrameBuilder::new().mar(0.85).build(), 15);

        let mild = FrameBuilder::new().mar(0.65).build();
        let analysis = session.process_frame(Some(&mild)).into_analysis().unwrap();

        assert_eq!(analysis.active_alerts, vec![DmsAlert::YawningDetected]);
        assert_eq!(
            analysis.alert_edges,
            vec![
                AlertEdge::Activated(DmsAlert::YawningDetected),
                AlertEdge::Deactivated(DmsAlert::ExcessiveYawning),
            ]
        );
        assert_eq!(analysis.transition, None);
        assert_eq!(analysis.driver_status, DriverStatus::Drowsy);
    }

    #[test]
    fn test_head_turned() {
        let mut session = session();
        let frame = FrameBuilder::new().yaw_ratio(3.0).build();

        let last = feed(&mut session, &frame, 15).pop().unwrap();
        assert_eq!(last.head_status, HeadStatus::Turned);
        assert_eq!(last.active_alerts, vec![DmsAlert::HeadNotForward]);
    }

    #[test]
    fn test_missing_face_freezes_counters() {
        let mut session = session();
        let closed = FrameBuilder::new().ear(0.10).build();

        feed(&mut session, &closed, 10);
        assert_eq!(session.process_frame(None), FrameOutcome::Skipped);
        assert_eq!(session.counters().eye_closed, 10);

        let results = feed(&mut session, &closed, 5);
        assert_eq!(results[3].eye_status, EyeStatus::Open);
        assert_eq!(results[4].eye_status, EyeStatus::Closed);
        assert_eq!(session.stats().frames_processed, 15);
        assert_eq!(session.stats().frames_skipped, 1);
    }

    #[test]
    fn test_missing_face_keeps_alerts() {
        let mut session = session();
        feed(&mut session, &FrameBuilder::new().ear(0.10).build(), 15);

        session.process_frame(None);
        assert_eq!(session.driver_status(), DriverStatus::Drowsy);
        assert_eq!(session.active_alerts(), vec![DmsAlert::EyesClosed]);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = session();
        let frame = FrameBuilder::new().ear(0.10).mar(0.7).yaw_ratio(0.2).build();
        feed(&mut session, &frame, 20);
        assert_eq!(session.active_alerts().len(), 3);

        assert_eq!(session.reset(), Some(AlertTransition::BecameInactive));
        assert_eq!(session.counters(), CounterSnapshot::default());
        assert!(session.active_alerts().is_empty());

        assert_eq!(session.reset(), None);
        assert_eq!(session.counters(), CounterSnapshot::default());
        assert!(session.active_alerts().is_empty());
        assert_eq!(session.driver_status(), DriverStatus::Safe);
    }

    #[test]
    fn test_frames_after_reset_start_from_zero() {
        let mut session = session();
        let closed = FrameBuilder::new().ear(0.10).build();
        feed(&mut session, &closed, 14);
        session.reset();

        let results = feed(&mut session, &closed, 14);
        assert!(results.iter().all(|a| a.eye_status == EyeStatus::Open));
        assert_eq!(results[0].frame, 1);
    }

    #[test]
    fn test_strict_preset_triggers_sooner() {
        let mut session = Session::new(DmsConfig::strict()).unwrap();
        let last = feed(&mut session, &FrameBuilder::new().yaw_ratio(0.1).build(), 10)
            .pop()
            .unwrap();
        assert_eq!(last.head_status, HeadStatus::Turned);
    }

    fn arb_detection() -> impl Strategy<Value = Option<(f32, f32, f32)>> {
        prop::option::weighted(0.9, (0.05f32..0.35, 0.1f32..1.0, 0.1f32..3.0))
    }

    proptest! {
        #[test]
        fn prop_session_invariants(frames in prop::collection::vec(arb_detection(), 1..200)) {
            let mut session = Session::new(DmsConfig::strict()).unwrap();
            for detection in frames {
                let frame = detection.map(|(ear, mar, yaw)| {
                    FrameBuilder::new().ear(ear).mar(mar).yaw_ratio(yaw).build()
                });
                let outcome = session.process_frame(frame.as_ref());

                let counters = session.counters();
                prop_assert!(counters.eye_closed == 0 || counters.eye_partial == 0);
                prop_assert_eq!(
                    !session.active_alerts().is_empty(),
                    session.driver_status() == DriverStatus::Drowsy
                );
                if let Some(analysis) = outcome.analysis() {
                    prop_assert_eq!(analysis.has_alerts(), analysis.driver_status == DriverStatus::Drowsy);
                    let yawn_alerts = analysis
                        .active_alerts
                        .iter()
                        .filter(|a| MouthOutcome::ALERTS.contains(a))
                        .count();
                    prop_assert!(yawn_alerts <= 1);
                }
            }
        }
    }
}
