//! Acquisition 指标收集模块
//!
//! 记录采集循环的运行指标，并在内存中聚合以便输出摘要。

use contracts::FramePair;
use metrics::{counter, gauge, histogram};

/// 记录一次成功采集的 frame pair
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_frame_acquired;
///
/// if let SourcePoll::Frame(frame) = source.poll_frame() {
///     record_frame_acquired(&frame, timestamp_ms);
/// }
/// ```
pub fn record_frame_acquired(frame: &FramePair, timestamp_ms: u64) {
    // 帧计数器
    counter!("tof_frames_total").increment(1);

    // 最近一帧的时间戳
    gauge!("tof_last_timestamp_ms").set(timestamp_ms as f64);

    // 有效 zone 数量
    let valid = frame.valid_zone_count();
    gauge!("tof_valid_zones_current").set(valid as f64);
    histogram!("tof_valid_zones").record(valid as f64);

    // 最近距离
    if let Some(nearest) = frame.valid_zones().map(|(_, distance, _)| distance).min() {
        gauge!("tof_nearest_distance_mm").set(f64::from(nearest));
    }
}

/// 记录 source 耗尽
pub fn record_source_exhausted(restarted: bool) {
    counter!("tof_source_exhausted_total").increment(1);
    if restarted {
        counter!("tof_source_restarts_total").increment(1);
    }
}

/// 记录 source 读取失败
pub fn record_source_failure(source: &str) {
    counter!(
        "tof_source_failures_total",
        "source" => source.to_string()
    )
    .increment(1);
}

/// 记录一次 persist 结果
pub fn record_persist(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "tof_persist_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录单次 tick 耗时
pub fn record_tick_latency_ms(latency_ms: f64) {
    counter!("tof_ticks_total").increment(1);
    histogram!("tof_tick_latency_ms").record(latency_ms);
}

/// 采集指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct AcquisitionMetricsAggregator {
    /// 总帧数
    pub total_frames: u64,

    /// 没有有效 zone 的帧数
    pub empty_frames: u64,

    /// 每帧有效 zone 统计
    pub valid_zone_stats: RunningStats,

    /// 有效 zone 距离统计 (mm)
    pub distance_stats: RunningStats,

    /// tick 耗时统计 (ms)
    pub tick_latency_stats: RunningStats,
}

impl AcquisitionMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, frame: &FramePair) {
        self.total_frames += 1;

        let valid = frame.valid_zone_count();
        if valid == 0 {
            self.empty_frames += 1;
        }
        self.valid_zone_stats.push(valid as f64);

        for (_, distance, _) in frame.valid_zones() {
            self.distance_stats.push(f64::from(distance));
        }
    }

    /// 记录 tick 耗时
    pub fn record_tick(&mut self, latency_ms: f64) {
        self.tick_latency_stats.push(latency_ms);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_frames: self.total_frames,
            empty_frames: self.empty_frames,
            empty_rate: if self.total_frames > 0 {
                self.empty_frames as f64 / self.total_frames as f64 * 100.0
            } else {
                0.0
            },
            valid_zones: StatsSummary::from(&self.valid_zone_stats),
            distance_mm: StatsSummary::from(&self.distance_stats),
            tick_latency_ms: StatsSummary::from(&self.tick_latency_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_frames: u64,
    pub empty_frames: u64,
    pub empty_rate: f64,
    pub valid_zones: StatsSummary,
    pub distance_mm: StatsSummary,
    pub tick_latency_ms: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Acquisition Metrics Summary ===")?;
        writeln!(f, "Total frames: {}", self.total_frames)?;
        writeln!(
            f,
            "Frames without valid zones: {} ({:.2}%)",
            self.empty_frames, self.empty_rate
        )?;
        writeln!(f, "Valid zones per frame: {}", self.valid_zones)?;
        writeln!(f, "Valid distance (mm): {}", self.distance_mm)?;
        writeln!(f, "Tick latency (ms): {}", self.tick_latency_ms)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(value);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = AcquisitionMetricsAggregator::new();

        let mut status = [0u8; 64];
        status[0] = 5;
        status[1] = 9;
        let mut distance = [0u8; 64];
        distance[0] = 100;
        distance[1] = 200;

        aggregator.update(&FramePair::new(distance, status));
        aggregator.update(&FramePair::default());
        aggregator.record_tick(1.5);

        let summary = aggregator.summary();
        assert_eq!(summary.total_frames, 2);
        assert_eq!(summary.empty_frames, 1);
        assert!((summary.empty_rate - 50.0).abs() < 1e-10);
        assert!((summary.valid_zones.mean - 1.0).abs() < 1e-10);
        assert!((summary.distance_mm.mean - 150.0).abs() < 1e-10);
        assert_eq!(summary.tick_latency_ms.count, 1);
        assert!(summary.to_string().contains("Total frames: 2"));

        aggregator.reset();
        assert_eq!(aggregator.total_frames, 0);
    }

    #[test]
    fn test_empty_summary_display() {
        let summary = StatsSummary::default();
        assert_eq!(summary.to_string(), "N/A");
    }
}
