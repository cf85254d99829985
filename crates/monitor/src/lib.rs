//! Drowsiness Monitor Host
//!
//! Reads landmark frames as JSON lines, drives a DMS session one frame at a
//! time, writes one analysis record per processed frame, and forwards alert
//! transitions to a notifier task.

use std::path::Path;

use anyhow::{Context, Result};
use dms::{AlertTransition, DmsConfig, LandmarkFrame, Session};
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod notifier;

pub use notifier::{Notifier, NotifierReport};

/// Built-in threshold presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Preset {
    #[default]
    Default,
    Strict,
    Lenient,
}

impl Preset {
    pub fn config(&self) -> DmsConfig {
        match self {
            Preset::Default => DmsConfig::default(),
            Preset::Strict => DmsConfig::strict(),
            Preset::Lenient => DmsConfig::lenient(),
        }
    }
}

/// One line of input: landmarks, or null when no face was detected
#[derive(Debug, Deserialize)]
pub struct InputRecord {
    pub landmarks: Option<LandmarkFrame>,
}

/// Totals for a monitoring run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonitorSummary {
    pub frames_processed: u64,
    pub frames_skipped: u64,
    pub transitions: u64,
}

/// Initialize logging to stderr
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Layer preset defaults, an optional file, and `DMS_*` environment variables
pub fn load_config(path: Option<&Path>, preset: Preset) -> Result<DmsConfig> {
    let mut builder = config::Config::builder()
        .add_source(config::Config::try_from(&preset.config()).context("encoding preset")?);

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let config: DmsConfig = builder
        .add_source(config::Environment::with_prefix("DMS").try_parsing(true))
        .build()
        .context("loading configuration")?
        .try_deserialize()
        .context("parsing configuration")?;

    config.validate()?;
    info!("Loaded DMS configuration: {:?}", config);
    Ok(config)
}

/// Parse one input line
pub fn parse_line(line: &str) -> Result<Option<LandmarkFrame>> {
    let record: InputRecord = serde_json::from_str(line)?;
    Ok(record.landmarks)
}

/// Run a session over every input line until end of input
///
/// A malformed line is a broken input contract and aborts the run.
/// End of input stops monitoring, which resets the session.
pub async fn run_monitor<R, W>(
    input: R,
    mut output: W,
    mut session: Session,
    notifications: mpsc::Sender<AlertTransition>,
) -> Result<MonitorSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = MonitorSummary::default();
    let mut lines = input.lines();
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await.context("reading input")? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let frame = parse_line(&line).with_context(|| format!("invalid frame on line {}", line_no))?;

        let Some(analysis) = session.process_frame(frame.as_ref()).into_analysis() else {
            continue;
        };

        if let Some(transition) = analysis.transition {
            summary.transitions += 1;
            notify(&notifications, transition).await;
        }

        let mut record = serde_json::to_vec(&analysis)?;
        record.push(b'\n');
        output.write_all(&record).await.context("writing analysis")?;
    }

    let stats = session.stats();
    summary.frames_processed = stats.frames_processed;
    summary.frames_skipped = stats.frames_skipped;

    if let Some(transition) = session.reset() {
        summary.transitions += 1;
        notify(&notifications, transition).await;
    }
    output.flush().await?;

    info!(
        "Monitoring stopped: {} processed, {} skipped, {} transitions",
        summary.frames_processed, summary.frames_skipped, summary.transitions
    );
    Ok(summary)
}

async fn notify(notifications: &mpsc::Sender<AlertTransition>, transition: AlertTransition) {
    if notifications.send(transition).await.is_err() {
        warn!("Notifier dropped, {:?} not delivered", transition);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dms::synthetic::FrameBuilder;
    use dms::Point3;
    use std::sync::Mutex;

    // load_config reads process-wide DMS_* variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn frame_line(builder: FrameBuilder) -> String {
        let points: Vec<Point3> = builder.build().into();
        serde_json::json!({ "landmarks": points }).to_string()
    }

    fn closed_then_open() -> String {
        let mut lines = Vec::new();
        for i in 0..16 {
            lines.push(frame_line(FrameBuilder::new().ear(0.1)));
            if i == 9 {
                lines.push(r#"{"landmarks": null}"#.to_string());
            }
        }
        lines.push(frame_line(FrameBuilder::new()));
        lines.join("\n")
    }

    #[test]
    fn test_parse_null_landmarks() {
        assert!(parse_line(r#"{"landmarks": null}"#).unwrap().is_none());
    }

    #[test]
    fn test_parse_rejects_short_frame() {
        let err = parse_line(r#"{"landmarks": [[0.0, 0.0, 0.0]]}"#).unwrap_err();
        assert!(err.to_string().contains("468"));
    }

    #[test]
    fn test_load_config_layers_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let path = std::env::temp_dir().join(format!("dms-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"consecutive_frames_threshold": 7, "mar_alert": 0.9}"#).unwrap();

        let config = load_config(Some(&path), Preset::Lenient).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.consecutive_frames_threshold, 7);
        assert!((config.mar_alert - 0.9).abs() < 1e-6);
        assert!((config.ear_closed - 0.18).abs() < 1e-6);
    }

    #[test]
    fn test_load_config_rejects_invalid_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let path = std::env::temp_dir().join(format!("dms-bad-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"yaw_left": 3.0}"#).unwrap();

        let result = load_config(Some(&path), Preset::Default);
        std::fs::remove_file(&path).ok();

        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_env_overrides_file_and_preset() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let path = std::env::temp_dir().join(format!("dms-env-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"consecutive_frames_threshold": 7}"#).unwrap();

        std::env::set_var("DMS_CONSECUTIVE_FRAMES_THRESHOLD", "9");
        std::env::set_var("DMS_EAR_CLOSED", "0.15");
        let result = load_config(Some(&path), Preset::Lenient);
        std::env::remove_var("DMS_CONSECUTIVE_FRAMES_THRESHOLD");
        std::env::remove_var("DMS_EAR_CLOSED");
        std::fs::remove_file(&path).ok();

        let config = result.unwrap();
        assert_eq!(config.consecutive_frames_threshold, 9);
        assert!((config.ear_closed - 0.15).abs() < 1e-6);
        assert!((config.ear_partial - 0.22).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_run_monitor_notifies_start_and_stop() {
        let input = closed_then_open();
        let mut output = Vec::new();
        let (tx, rx) = mpsc::channel(8);
        let notifier = Notifier::spawn(rx);

        let session = Session::new(DmsConfig::default()).unwrap();
        let summary = run_monitor(input.as_bytes(), &mut output, session, tx).await.unwrap();
        let report = notifier.await.unwrap();

        assert_eq!(summary.frames_processed, 17);
        assert_eq!(summary.frames_skipped, 1);
        assert_eq!(summary.transitions, 2);
        assert_eq!(report, NotifierReport { started: 1, stopped: 1 });

        let records: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 17);
        assert_eq!(records[14]["eyeStatus"], "CLOSED");
        assert_eq!(records[14]["driverStatus"], "DROWSY");
        assert_eq!(records[16]["eyeStatus"], "OPEN");
        assert_eq!(records[16]["driverStatus"], "SAFE");
    }

    #[tokio::test]
    async fn test_end_of_input_resets_active_alarm() {
        let input = (0..15)
            .map(|_| frame_line(FrameBuilder::new().yaw_ratio(0.1)))
            .collect::<Vec<_>>()
            .join("\n");
        let (tx, rx) = mpsc::channel(8);
        let notifier = Notifier::spawn(rx);

        let session = Session::new(DmsConfig::default()).unwrap();
        run_monitor(input.as_bytes(), tokio::io::sink(), session, tx).await.unwrap();

        let report = notifier.await.unwrap();
        assert_eq!(report, NotifierReport { started: 1, stopped: 1 });
    }

    #[tokio::test]
    async fn test_malformed_line_is_fatal() {
        let input = format!("{}\nnot json\n", frame_line(FrameBuilder::new()));
        let (tx, _rx) = mpsc::channel(8);

        let session = Session::new(DmsConfig::default()).unwrap();
        let err = run_monitor(input.as_bytes(), tokio::io::sink(), session, tx)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
