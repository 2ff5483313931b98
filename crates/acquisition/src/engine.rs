//! Periodic acquisition loop.

use std::time::Duration;

use contracts::{ContractError, FrameSource, LoopConfig, RecordSink};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{error, info, instrument};

use crate::clock::Clock;
use crate::session::AcquisitionSession;
use crate::stats::AcquisitionStats;

/// Fixed-period driver of an [`AcquisitionSession`]
///
/// Runs until the shutdown channel flips to `true` or `max_ticks` ticks have
/// run. The shutdown flag is checked once per tick and also interrupts the
/// sleep between ticks.
#[derive(Debug, Clone, Copy)]
pub struct AcquisitionLoop {
    interval: Duration,
    max_ticks: Option<u64>,
}

impl AcquisitionLoop {
    /// Build from the loop section of the blueprint
    pub fn new(config: &LoopConfig) -> Self {
        Self {
            interval: config.polling_interval(),
            max_ticks: config.max_ticks,
        }
    }

    /// Explicit period, unbounded
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            max_ticks: None,
        }
    }

    /// Stop after `max_ticks` ticks
    pub fn max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    /// Polling period
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run the session to completion and close it
    ///
    /// # Errors
    /// A fatal tick error (failed replay rewind) or a failure to close the
    /// sink. The session is closed in both cases.
    #[instrument(
        name = "acquisition_loop_run",
        skip(self, session, shutdown),
        fields(interval_ms = self.interval.as_millis() as u64, max_ticks = ?self.max_ticks)
    )]
    pub async fn run<S, K, C>(
        &self,
        mut session: AcquisitionSession<S, K, C>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<AcquisitionStats, ContractError>
    where
        S: FrameSource,
        K: RecordSink,
        C: Clock,
    {
        let started = Instant::now();
        info!("Acquisition loop started");

        let result = self.drive(&mut session, &mut shutdown).await;
        let closed = session.close().await;

        let mut stats = session.stats();
        stats.duration = started.elapsed();

        if let Err(e) = result {
            error!(error = %e, ticks = stats.ticks, "Acquisition loop aborted");
            return Err(e);
        }
        closed?;

        info!(
            ticks = stats.ticks,
            frames = stats.frames,
            records = stats.records_written,
            duration_secs = stats.duration.as_secs_f64(),
            "Acquisition loop stopped"
        );
        Ok(stats)
    }

    async fn drive<S, K, C>(
        &self,
        session: &mut AcquisitionSession<S, K, C>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), ContractError>
    where
        S: FrameSource,
        K: RecordSink,
        C: Clock,
    {
        let mut ticks: u64 = 0;

        loop {
            if *shutdown.borrow() {
                info!(ticks, "Shutdown requested");
                return Ok(());
            }

            session.tick().await?;
            ticks += 1;

            if self.max_ticks.is_some_and(|max| ticks >= max) {
                info!(ticks, "Reached max ticks limit");
                return Ok(());
            }

            self.pause(shutdown).await;
        }
    }

    /// Sleep one polling period, cut short only by a shutdown request
    async fn pause(&self, shutdown: &mut watch::Receiver<bool>) {
        let sleep = tokio::time::sleep(self.interval);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return,
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        // Sender dropped: nobody can request shutdown any more
                        sleep.as_mut().await;
                        return;
                    }
                    if *shutdown.borrow_and_update() {
                        return;
                    }
                }
            }
        }
    }
}
