//! Log summary - 整个日志的统计
//!
//! Consumes a frame source once, without persisting anything, and reports
//! per-zone distance statistics and validity percentages.

use contracts::{FramePair, FrameSource, SourcePoll, ZONE_COUNT};
use serde::Serialize;
use tracing::debug;

use crate::config::IngestionMetrics;
use crate::error::IngestionError;

/// Running sums for one quantity (population statistics)
#[derive(Debug, Default, Clone, Copy)]
struct Moments {
    n: u64,
    sum: f64,
    sum_sq: f64,
}

impl Moments {
    fn push(&mut self, value: f64) {
        self.n += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    fn mean(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.sum / self.n as f64
        }
    }

    fn std(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.sum_sq / self.n as f64 - mean * mean).max(0.0).sqrt()
    }
}

/// Statistics over every frame pair of a log
#[derive(Debug, Clone, Serialize)]
pub struct LogSummary {
    /// Frame pairs found
    pub frames: u64,

    /// Candidate frames dropped (malformed or without status line)
    pub skipped: u64,

    /// Mean number of valid zones per frame
    pub valid_per_frame_mean: f64,

    /// Standard deviation of valid zones per frame
    pub valid_per_frame_std: f64,

    /// Per-zone mean distance over all frames, row-major
    pub distance_mean: Vec<f64>,

    /// Per-zone distance standard deviation, row-major
    pub distance_std: Vec<f64>,

    /// Per-zone percentage of frames with a valid status, row-major
    pub validity_percent: Vec<f64>,
}

/// Accumulates frames into a [`LogSummary`]
#[derive(Debug)]
pub struct SummaryBuilder {
    frames: u64,
    valid_per_frame: Moments,
    distance: [Moments; ZONE_COUNT],
    valid_hits: [u64; ZONE_COUNT],
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self {
            frames: 0,
            valid_per_frame: Moments::default(),
            distance: [Moments::default(); ZONE_COUNT],
            valid_hits: [0; ZONE_COUNT],
        }
    }
}

impl SummaryBuilder {
    /// Add one frame pair
    pub fn push(&mut self, frame: &FramePair) {
        self.frames += 1;
        self.valid_per_frame.push(frame.valid_zone_count() as f64);

        for (zone, &distance) in frame.distance.iter().enumerate() {
            self.distance[zone].push(f64::from(distance));
        }
        for (zone, _, _) in frame.valid_zones() {
            self.valid_hits[zone] += 1;
        }
    }

    /// Finish with the number of skipped candidates
    pub fn finish(self, skipped: u64) -> LogSummary {
        let frames = self.frames;
        let validity_percent = self
            .valid_hits
            .iter()
            .map(|&hits| {
                if frames == 0 {
                    0.0
                } else {
                    hits as f64 * 100.0 / frames as f64
                }
            })
            .collect();

        LogSummary {
            frames,
            skipped,
            valid_per_frame_mean: self.valid_per_frame.mean(),
            valid_per_frame_std: self.valid_per_frame.std(),
            distance_mean: self.distance.iter().map(Moments::mean).collect(),
            distance_std: self.distance.iter().map(Moments::std).collect(),
            validity_percent,
        }
    }
}

impl LogSummary {
    /// Poll `source` until exhausted and summarize what it produced
    ///
    /// `metrics` must be the source's own metrics handle; its malformed and
    /// orphan counters become [`LogSummary::skipped`].
    ///
    /// # Errors
    /// `IngestionError::ReadFailure` on the first failed read.
    pub fn collect<S: FrameSource + ?Sized>(
        source: &mut S,
        metrics: &IngestionMetrics,
    ) -> Result<Self, IngestionError> {
        let mut builder = SummaryBuilder::default();

        loop {
            match source.poll_frame() {
                SourcePoll::Frame(frame) => builder.push(&frame),
                SourcePoll::Exhausted => break,
                SourcePoll::Failure(reason) => {
                    return Err(IngestionError::ReadFailure {
                        name: source.name().to_string(),
                        reason,
                    });
                }
            }
        }

        let skipped = metrics.snapshot().skipped_frames();
        debug!(source = source.name(), frames = builder.frames, skipped, "Log scan complete");
        Ok(builder.finish(skipped))
    }

    /// Whether the log contained no frame pair at all
    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::replay::ReplaySource;
    use contracts::MalformedPolicy;
    use std::io::Cursor;

    fn frame(distance: u8, valid: bool) -> FramePair {
        FramePair::new([distance; 64], [if valid { 5 } else { 0 }; 64])
    }

    #[test]
    fn test_builder_statistics() {
        let mut builder = SummaryBuilder::default();
        builder.push(&frame(100, true));
        builder.push(&frame(200, false));

        let summary = builder.finish(3);
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.distance_mean.len(), ZONE_COUNT);
        assert!((summary.distance_mean[0] - 150.0).abs() < 1e-9);
        assert!((summary.distance_std[63] - 50.0).abs() < 1e-9);
        assert!((summary.validity_percent[7] - 50.0).abs() < 1e-9);
        assert!((summary.valid_per_frame_mean - 32.0).abs() < 1e-9);
        assert!((summary.valid_per_frame_std - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_builder() {
        let summary = SummaryBuilder::default().finish(0);
        assert!(summary.is_empty());
        assert_eq!(summary.validity_percent[0], 0.0);
        assert_eq!(summary.valid_per_frame_std, 0.0);
    }

    #[test]
    fn test_collect_from_replay() {
        let distance = codec::encode(&[42u8; 64]);
        let status = codec::encode(&[9u8; 64]);
        let log = format!(
            "TOF: HEX DATA: {distance}\nTOF: TARGET STATUS: {status}\n\
             TOF: HEX DATA: {}\nTOF: TARGET STATUS: {status}\n\
             TOF: HEX DATA: {distance}\nTOF: TARGET STATUS: {status}\n",
            &distance[..100]
        );

        let mut source =
            ReplaySource::from_reader("inspect", Cursor::new(log.into_bytes()), MalformedPolicy::Skip);
        let metrics = source.metrics();
        let summary = LogSummary::collect(&mut source, &metrics).unwrap();

        assert_eq!(summary.frames, 2);
        assert_eq!(summary.skipped, 1);
        assert!((summary.validity_percent[12] - 100.0).abs() < 1e-9);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["frames"], 2);
    }
}
