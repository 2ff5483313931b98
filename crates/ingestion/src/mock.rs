//! Mock 传感器驱动
//!
//! 用于无硬件环境的测试。生成确定性的 frame pair，并可按周期注入读取失败。

use contracts::{ContractError, FramePair, MockDriverConfig, SensorDriver, StatusCode, ZONE_COUNT};
use tracing::{debug, trace};

/// Mock 传感器驱动
///
/// Read `n` (1-based) fails when `failure_every > 0 && n % failure_every == 0`.
/// Otherwise zone `z` reports `base_distance_mm + z` (wrapping) and a status
/// cycling through valid, valid-large-pulse, invalid and "no target".
#[derive(Debug)]
pub struct MockDriver {
    config: MockDriverConfig,
    initialized: bool,
    ranging: bool,
    reads: u64,
}

impl MockDriver {
    /// 创建新的 Mock 驱动
    pub fn new(config: MockDriverConfig) -> Self {
        Self {
            config,
            initialized: false,
            ranging: false,
            reads: 0,
        }
    }

    /// Number of `read_frame` calls so far, failed ones included
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Whether ranging is currently started
    pub fn is_ranging(&self) -> bool {
        self.ranging
    }

    /// The frame every successful read returns
    pub fn frame(&self) -> FramePair {
        let mut distance = [0u8; ZONE_COUNT];
        let mut status = [0u8; ZONE_COUNT];

        for zone in 0..ZONE_COUNT {
            distance[zone] = self.config.base_distance_mm.wrapping_add(zone as u8);
            status[zone] = match zone % 4 {
                0 => StatusCode::RANGE_VALID.0,
                1 => StatusCode::RANGE_VALID_LARGE_PULSE.0,
                2 => 0,
                _ => 255,
            };
        }

        FramePair::new(distance, status)
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new(MockDriverConfig::default())
    }
}

impl SensorDriver for MockDriver {
    fn name(&self) -> &str {
        "mock_tof"
    }

    fn init(&mut self) -> Result<(), ContractError> {
        if self.config.fail_init {
            return Err(ContractError::driver_failure(
                self.name(),
                "sensor not detected on bus",
            ));
        }

        self.initialized = true;
        debug!(driver = self.name(), "Mock driver initialized");
        Ok(())
    }

    fn start_ranging(&mut self) -> Result<(), ContractError> {
        if !self.initialized {
            return Err(ContractError::driver_failure(
                self.name(),
                "start_ranging before init",
            ));
        }

        self.ranging = true;
        Ok(())
    }

    fn read_frame(&mut self) -> Result<FramePair, ContractError> {
        self.reads += 1;

        if !self.ranging {
            return Err(ContractError::driver_failure(self.name(), "not ranging"));
        }

        let every = self.config.failure_every;
        if every > 0 && self.reads % every == 0 {
            trace!(driver = self.name(), read = self.reads, "Injected read failure");
            return Err(ContractError::driver_failure(
                self.name(),
                format!("injected failure on read {}", self.reads),
            ));
        }

        Ok(self.frame())
    }

    fn stop_ranging(&mut self) -> Result<(), ContractError> {
        self.ranging = false;
        debug!(driver = self.name(), reads = self.reads, "Mock driver stopped");
        Ok(())
    }
}
