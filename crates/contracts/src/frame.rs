//! FramePair / ZoneRecord - source output and sink input
//!
//! One frame pair is a synchronized distance + status snapshot across all
//! zones of the sensor. One record is a single valid zone of one frame pair.

use serde::{Deserialize, Serialize};

/// Number of zones per frame (8x8 sensor grid, one byte per zone)
pub const ZONE_COUNT: usize = 64;

/// Side length of the square zone grid
pub const GRID_SIDE: usize = 8;

/// Column names of the persisted record store, in order
pub const RECORD_HEADER: [&str; 4] = ["timestamp_ms", "zone_id", "distance_mm", "status"];

/// Per-zone measurement status code
///
/// Only [`StatusCode::RANGE_VALID`] and [`StatusCode::RANGE_VALID_LARGE_PULSE`]
/// are persisted; every other code is dropped at persistence time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCode(pub u8);

impl StatusCode {
    /// Target detected, range valid
    pub const RANGE_VALID: Self = Self(5);

    /// Target detected with a large pulse, range valid
    pub const RANGE_VALID_LARGE_PULSE: Self = Self(9);

    /// Whether a zone with this status should be persisted
    pub fn is_valid(self) -> bool {
        self == Self::RANGE_VALID || self == Self::RANGE_VALID_LARGE_PULSE
    }
}

impl From<u8> for StatusCode {
    fn from(code: u8) -> Self {
        Self(code)
    }
}

/// Synchronized distance + status snapshot
///
/// `distance[i]` is only meaningful together with `status[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePair {
    /// Distance per zone in millimeters (saturating at 255)
    pub distance: [u8; ZONE_COUNT],

    /// Measurement status per zone
    pub status: [u8; ZONE_COUNT],
}

impl FramePair {
    /// Build a frame pair from its two buffers
    pub fn new(distance: [u8; ZONE_COUNT], status: [u8; ZONE_COUNT]) -> Self {
        Self { distance, status }
    }

    /// Number of zones whose status is valid
    pub fn valid_zone_count(&self) -> usize {
        self.status
            .iter()
            .filter(|&&code| StatusCode(code).is_valid())
            .count()
    }

    /// Valid zones in ascending zone order as `(zone_id, distance_mm, status)`
    pub fn valid_zones(&self) -> impl Iterator<Item = (usize, u8, StatusCode)> + '_ {
        self.distance
            .iter()
            .zip(self.status.iter())
            .enumerate()
            .filter(|(_, (_, code))| StatusCode(**code).is_valid())
            .map(|(zone, (&distance, &code))| (zone, distance, StatusCode(code)))
    }
}

impl Default for FramePair {
    fn default() -> Self {
        Self {
            distance: [0; ZONE_COUNT],
            status: [0; ZONE_COUNT],
        }
    }
}

/// One persisted measurement
///
/// Created once per valid zone per frame pair; never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRecord {
    /// Session-relative timestamp (ms)
    pub timestamp_ms: u64,

    /// Zone index in `[0, ZONE_COUNT)`
    pub zone_id: u8,

    /// Distance in millimeters
    pub distance_mm: u8,

    /// Status code (always 5 or 9)
    pub status: u8,
}

impl ZoneRecord {
    /// Extract the records of a frame pair, in ascending zone order
    pub fn from_frame(frame: &FramePair, timestamp_ms: u64) -> Vec<ZoneRecord> {
        frame
            .valid_zones()
            .map(|(zone, distance, status)| ZoneRecord {
                timestamp_ms,
                // ZONE_COUNT fits in a u8
                zone_id: zone as u8,
                distance_mm: distance,
                status: status.0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_five_and_nine_are_valid() {
        let valid: Vec<u8> = (0..=u8::MAX)
            .filter(|&code| StatusCode(code).is_valid())
            .collect();
        assert_eq!(valid, vec![5, 9]);
    }

    #[test]
    fn test_records_follow_zone_order() {
        let mut frame = FramePair::default();
        frame.status[40] = 9;
        frame.status[4] = 5;
        frame.status[18] = 6;
        frame.distance[4] = 120;
        frame.distance[40] = 255;

        let records = ZoneRecord::from_frame(&frame, 1500);
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            ZoneRecord {
                timestamp_ms: 1500,
                zone_id: 4,
                distance_mm: 120,
                status: 5
            }
        );
        assert_eq!(records[1].zone_id, 40);
        assert_eq!(records[1].distance_mm, 255);
        assert_eq!(frame.valid_zone_count(), 2);
    }

    #[test]
    fn test_no_valid_status_no_records() {
        let frame = FramePair::new([77; ZONE_COUNT], [3; ZONE_COUNT]);
        assert!(ZoneRecord::from_frame(&frame, 0).is_empty());
    }

    #[test]
    fn test_record_serializes_with_header_names() {
        let record = ZoneRecord {
            timestamp_ms: 10,
            zone_id: 2,
            distance_mm: 3,
            status: 9,
        };
        let json = serde_json::to_value(record).unwrap();
        for column in RECORD_HEADER {
            assert!(json.get(column).is_some(), "missing column {column}");
        }
    }
}
