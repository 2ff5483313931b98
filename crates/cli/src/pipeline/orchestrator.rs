//! Pipeline orchestrator - builds the session from the blueprint and runs it.

use std::sync::Arc;

use acquisition::{AcquisitionLoop, AcquisitionSession, AcquisitionStats};
use anyhow::{Context, Result};
use contracts::{AcquisitionBlueprint, FrameSource, SourceKind};
use dispatcher::{open_sink, HexTrace};
use ingestion::{IngestionMetrics, LiveSource, MockDriver, ReplaySource};
use tokio::sync::watch;
use tracing::info;

use crate::error::CliError;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Validated blueprint (CLI overrides applied)
    pub blueprint: AcquisitionBlueprint,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Open source, sink and trace, then run the loop until shutdown
    ///
    /// Failing to open the source or the sink aborts before the first tick.
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<AcquisitionStats> {
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        let (source, source_metrics) = open_source(blueprint)?;
        info!(source = %source.name(), kind = ?blueprint.source.kind, "Frame source ready");

        let sink = open_sink(&blueprint.sink)
            .map_err(|e| CliError::SinkOpen(e.into()))
            .with_context(|| format!("sink '{}'", blueprint.sink.name))?;
        info!(
            sink = %blueprint.sink.name,
            kind = ?blueprint.sink.kind,
            path = %blueprint.sink.path.display(),
            "Record sink ready"
        );

        let trace = if blueprint.trace.enabled {
            HexTrace::stdout(&blueprint.trace)
        } else {
            HexTrace::disabled()
        };

        let session =
            AcquisitionSession::new(source, sink, trace).with_source_metrics(source_metrics);
        let acquisition = AcquisitionLoop::new(&blueprint.acquisition);

        info!(
            interval_ms = blueprint.acquisition.polling_interval_ms,
            max_ticks = ?blueprint.acquisition.max_ticks,
            "Pipeline running"
        );

        let stats = acquisition
            .run(session, shutdown)
            .await
            .context("Acquisition loop failed")?;

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            fps = format!("{:.2}", stats.fps()),
            skipped_frames = stats.skipped_frames(),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}

/// Open the frame source selected by the blueprint, with its counters
fn open_source(
    blueprint: &AcquisitionBlueprint,
) -> Result<(Box<dyn FrameSource>, Arc<IngestionMetrics>)> {
    let source = &blueprint.source;

    let opened: (Box<dyn FrameSource>, Arc<IngestionMetrics>) = match source.kind {
        SourceKind::Replay => {
            let replay = ReplaySource::open(&source.path, source.malformed)
                .map_err(|e| CliError::SourceOpen(e.into()))
                .with_context(|| format!("replay log {}", source.path.display()))?;
            let metrics = replay.metrics();
            (Box::new(replay), metrics)
        }
        SourceKind::Mock => {
            info!("Running in MOCK mode (no sensor required)");
            let live = LiveSource::start(MockDriver::new(source.mock.clone()))
                .map_err(|e| CliError::SourceOpen(e.into()))
                .context("mock sensor")?;
            let metrics = live.metrics();
            (Box::new(live), metrics)
        }
    };

    Ok(opened)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SinkType;

    #[tokio::test]
    async fn test_mock_pipeline_runs_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let mut blueprint = AcquisitionBlueprint::default();
        blueprint.source.kind = SourceKind::Mock;
        blueprint.sink.path = dir.path().join("mock.csv");
        blueprint.acquisition.polling_interval_ms = 1;
        blueprint.acquisition.max_ticks = Some(3);
        blueprint.trace.enabled = false;

        let (_tx, rx) = watch::channel(false);
        let stats = Pipeline::new(PipelineConfig {
            blueprint: blueprint.clone(),
            metrics_port: None,
        })
        .run(rx)
        .await
        .unwrap();

        assert_eq!(stats.ticks, 3);
        assert_eq!(stats.records_written, 3 * 32);

        let content = std::fs::read_to_string(&blueprint.sink.path).unwrap();
        assert_eq!(content.lines().count(), 1 + 3 * 32);
    }

    #[tokio::test]
    async fn test_replay_run_reports_skipped_frames() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("capture.log");
        let pair = format!(
            "TOF: HEX DATA: {}\nTOF: TARGET STATUS: {}\n",
            "0".repeat(128),
            "05".repeat(64)
        );
        std::fs::write(&log, format!("TOF: HEX DATA: {}\n{pair}", "0".repeat(127))).unwrap();

        let mut blueprint = AcquisitionBlueprint::default();
        blueprint.source.path = log;
        blueprint.sink.path = dir.path().join("out.csv");
        blueprint.acquisition.polling_interval_ms = 1;
        blueprint.acquisition.max_ticks = Some(1);
        blueprint.trace.enabled = false;

        let (_tx, rx) = watch::channel(false);
        let stats = Pipeline::new(PipelineConfig {
            blueprint,
            metrics_port: None,
        })
        .run(rx)
        .await
        .unwrap();

        assert_eq!(stats.frames, 1);
        assert_eq!(stats.records_written, 64);
        assert_eq!(stats.malformed_frames, 1);
        assert_eq!(stats.skipped_frames(), 1);
    }

    #[tokio::test]
    async fn test_missing_replay_log_aborts_startup() {
        let dir = tempfile::tempdir().unwrap();
        let mut blueprint = AcquisitionBlueprint::default();
        blueprint.source.path = dir.path().join("missing.log");
        blueprint.sink.kind = SinkType::Log;

        let (_tx, rx) = watch::channel(false);
        let err = Pipeline::new(PipelineConfig {
            blueprint,
            metrics_port: None,
        })
        .run(rx)
        .await
        .unwrap_err();

        assert!(err.downcast_ref::<CliError>().is_some());
    }
}
