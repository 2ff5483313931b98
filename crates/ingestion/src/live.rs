//! Live Source - 实时传感器读取
//!
//! Wraps a [`SensorDriver`]. Every poll performs one driver read; a failed
//! read is reported as [`SourcePoll::Failure`] and the next poll simply tries
//! again. Live input never reports exhaustion.

use std::sync::Arc;

use contracts::{FrameSource, SensorDriver, SourcePoll};
use metrics::counter;
use tracing::{debug, info, warn};

use crate::config::IngestionMetrics;
use crate::error::IngestionError;

/// Live sensor source
pub struct LiveSource<D: SensorDriver> {
    name: String,
    driver: D,
    running: bool,
    metrics: Arc<IngestionMetrics>,
}

impl<D: SensorDriver> LiveSource<D> {
    /// Initialize the driver and start continuous ranging
    ///
    /// # Errors
    /// `IngestionError::DriverStart` when init or start_ranging fails.
    pub fn start(mut driver: D) -> Result<Self, IngestionError> {
        let name = driver.name().to_string();

        driver
            .init()
            .and_then(|_| driver.start_ranging())
            .map_err(|e| IngestionError::DriverStart {
                driver: name.clone(),
                message: e.to_string(),
            })?;

        info!(driver = %name, "Sensor ranging started");

        Ok(Self {
            name,
            driver,
            running: true,
            metrics: Arc::new(IngestionMetrics::new()),
        })
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Access the wrapped driver
    pub fn driver(&self) -> &D {
        &self.driver
    }
}

impl<D: SensorDriver> FrameSource for LiveSource<D> {
    fn name(&self) -> &str {
        &self.name
    }

    fn poll_frame(&mut self) -> SourcePoll {
        if !self.running {
            return SourcePoll::Failure(
                IngestionError::Closed {
                    name: self.name.clone(),
                }
                .to_string(),
            );
        }

        match self.driver.read_frame() {
            Ok(frame) => {
                self.metrics.record_frame();
                SourcePoll::Frame(frame)
            }
            Err(e) => {
                self.metrics.record_read_failure();
                counter!("tof_read_failures_total").increment(1);
                debug!(driver = %self.name, error = %e, "Sensor read failed");
                SourcePoll::Failure(e.to_string())
            }
        }
    }

    fn close(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;

        if let Err(e) = self.driver.stop_ranging() {
            warn!(driver = %self.name, error = %e, "Failed to stop ranging");
        } else {
            info!(driver = %self.name, "Sensor ranging stopped");
        }
    }
}

impl<D: SensorDriver> Drop for LiveSource<D> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;
    use contracts::{ContractError, MockDriverConfig};

    #[test]
    fn test_start_and_poll() {
        let mut source = LiveSource::start(MockDriver::default()).unwrap();
        assert!(matches!(source.poll_frame(), SourcePoll::Frame(_)));
        assert!(!source.supports_restart());
        assert!(source.restart().is_ok());
        assert_eq!(source.metrics().snapshot().frames_decoded, 1);
    }

    #[test]
    fn test_start_failure_is_fatal() {
        let driver = MockDriver::new(MockDriverConfig {
            fail_init: true,
            ..Default::default()
        });
        let err: ContractError = LiveSource::start(driver).err().unwrap().into();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("mock_tof"));
    }

    #[test]
    fn test_failure_then_recovery() {
        let driver = MockDriver::new(MockDriverConfig {
            failure_every: 2,
            ..Default::default()
        });
        let mut source = LiveSource::start(driver).unwrap();

        assert!(matches!(source.poll_frame(), SourcePoll::Frame(_)));
        assert!(matches!(source.poll_frame(), SourcePoll::Failure(_)));
        assert!(matches!(source.poll_frame(), SourcePoll::Frame(_)));

        let snapshot = source.metrics().snapshot();
        assert_eq!(snapshot.frames_decoded, 2);
        assert_eq!(snapshot.read_failures, 1);
    }

    #[test]
    fn test_close_stops_ranging() {
        let mut source = LiveSource::start(MockDriver::default()).unwrap();
        source.close();
        assert!(!source.driver().is_ranging());
        assert!(matches!(source.poll_frame(), SourcePoll::Failure(_)));
        // second close is a no-op
        source.close();
    }
}
