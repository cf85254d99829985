//! Alarm notifier
//!
//! Consumes aggregate alert transitions and starts or stops the looping
//! alarm. Here the alarm is a log line; audio output plugs in at the same seam.

use dms::AlertTransition;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Counts of alarm starts and stops delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct NotifierReport {
    pub started: u64,
    pub stopped: u64,
}

/// Notifier task handle
pub struct Notifier;

impl Notifier {
    /// Spawn the notifier; it runs until every sender is dropped
    pub fn spawn(mut receiver: mpsc::Receiver<AlertTransition>) -> JoinHandle<NotifierReport> {
        tokio::spawn(async move {
            let mut report = NotifierReport::default();
            let mut sounding = false;

            while let Some(transition) = receiver.recv().await {
                match transition {
                    AlertTransition::BecameActive if !sounding => {
                        sounding = true;
                        report.started += 1;
                        warn!("Drowsiness alarm started");
                    }
                    AlertTransition::BecameInactive if sounding => {
                        sounding = false;
                        report.stopped += 1;
                        info!("Drowsiness alarm stopped");
                    }
                    other => debug!("Ignoring redundant transition {:?}", other),
                }
            }

            debug!("Notifier channel closed");
            report
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_redundant_transitions_ignored() {
        let (tx, rx) = mpsc::channel(8);
        let handle = Notifier::spawn(rx);

        tx.send(AlertTransition::BecameInactive).await.unwrap();
        tx.send(AlertTransition::BecameActive).await.unwrap();
        tx.send(AlertTransition::BecameActive).await.unwrap();
        tx.send(AlertTransition::BecameInactive).await.unwrap();
        drop(tx);

        let report = handle.await.unwrap();
        assert_eq!(report, NotifierReport { started: 1, stopped: 1 });
    }
}
