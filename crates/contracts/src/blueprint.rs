//! AcquisitionBlueprint - Config Loader output
//!
//! Describes one acquisition session: where frames come from, where records
//! go, how often the loop polls and how the debug trace looks. Every field has
//! a default matching the reference deployment, so an empty document is a
//! valid configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default replay log, expected in the working directory
pub const DEFAULT_REPLAY_PATH: &str = "device-monitor-250706-173207.log";

/// Default record store, created in the working directory
pub const DEFAULT_OUTPUT_PATH: &str = "tof_log.csv";

/// Default polling period (5 Hz)
pub const DEFAULT_POLLING_INTERVAL_MS: u64 = 200;

/// Log marker preceding a distance buffer
pub const DISTANCE_PREFIX: &str = "TOF: HEX DATA";

/// Log marker preceding a status buffer
pub const STATUS_PREFIX: &str = "TOF: TARGET STATUS";

/// 配置版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete session configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AcquisitionBlueprint {
    /// 配置版本
    #[serde(default)]
    pub version: ConfigVersion,

    /// Frame source settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Record store settings
    #[serde(default)]
    pub sink: SinkConfig,

    /// Polling loop settings
    #[serde(default)]
    pub acquisition: LoopConfig,

    /// Debug trace settings
    #[serde(default)]
    pub trace: TraceConfig,
}

/// Frame source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Which source variant to open
    #[serde(default)]
    pub kind: SourceKind,

    /// Replay log path (replay only)
    #[serde(default = "default_replay_path")]
    pub path: PathBuf,

    /// What to do with malformed candidate frames
    #[serde(default)]
    pub malformed: MalformedPolicy,

    /// Mock driver settings (mock only)
    #[serde(default)]
    pub mock: MockDriverConfig,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            path: default_replay_path(),
            malformed: MalformedPolicy::default(),
            mock: MockDriverConfig::default(),
        }
    }
}

fn default_replay_path() -> PathBuf {
    PathBuf::from(DEFAULT_REPLAY_PATH)
}

/// Source variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Replay a captured serial log, looping forever
    #[default]
    Replay,
    /// Live source backed by the mock sensor driver
    Mock,
}

/// Handling of malformed HEX DATA / TARGET STATUS lines
///
/// Both policies drop the frame and keep scanning; they differ only in how
/// loudly the drop is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Drop silently (debug log only)
    #[default]
    Skip,
    /// Drop and emit a warning with line number and reason
    Report,
}

/// Mock sensor driver settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockDriverConfig {
    /// Fail every n-th read (0 = never)
    #[serde(default)]
    pub failure_every: u64,

    /// Distance of zone 0; other zones ramp up from it
    #[serde(default = "default_base_distance")]
    pub base_distance_mm: u8,

    /// Fail sensor initialization
    #[serde(default)]
    pub fail_init: bool,
}

impl Default for MockDriverConfig {
    fn default() -> Self {
        Self {
            failure_every: 0,
            base_distance_mm: default_base_distance(),
            fail_init: false,
        }
    }
}

fn default_base_distance() -> u8 {
    120
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name (used in logs and errors)
    #[serde(default = "default_sink_name")]
    pub name: String,

    /// Sink type
    #[serde(default)]
    pub kind: SinkType,

    /// Output path (csv only)
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            name: default_sink_name(),
            kind: SinkType::default(),
            path: default_output_path(),
        }
    }
}

fn default_sink_name() -> String {
    "tof_csv".to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

/// Sink 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Append-only CSV file
    #[default]
    Csv,
    /// Tracing output only (nothing persisted)
    Log,
}

/// Polling loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopConfig {
    /// Sleep between ticks (ms), must be > 0
    #[serde(default = "default_polling_interval")]
    pub polling_interval_ms: u64,

    /// Stop after this many ticks (None = run until shutdown)
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

impl LoopConfig {
    /// Polling period as a `Duration`
    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval_ms)
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            polling_interval_ms: default_polling_interval(),
            max_ticks: None,
        }
    }
}

fn default_polling_interval() -> u64 {
    DEFAULT_POLLING_INTERVAL_MS
}

/// Debug trace configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceConfig {
    /// Emit the two hex lines per frame pair
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Prefix of the distance line
    #[serde(default = "default_distance_prefix")]
    pub distance_prefix: String,

    /// Prefix of the status line
    #[serde(default = "default_status_prefix")]
    pub status_prefix: String,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            distance_prefix: default_distance_prefix(),
            status_prefix: default_status_prefix(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_distance_prefix() -> String {
    DISTANCE_PREFIX.to_string()
}

fn default_status_prefix() -> String {
    STATUS_PREFIX.to_string()
}
