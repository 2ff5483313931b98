//! Replay Source - 从串口日志回放传感器数据
//!
//! Scans a captured serial log for `TOF: HEX DATA:` lines, each immediately
//! followed by its `TOF: TARGET STATUS:` line, and turns every complete pair
//! into a [`FramePair`]. Malformed candidates are dropped and scanning moves
//! on; a corrupt capture never halts replay.

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use contracts::{
    ContractError, FramePair, FrameSource, MalformedPolicy, SourcePoll, DISTANCE_PREFIX,
    STATUS_PREFIX,
};
use metrics::counter;
use tracing::{debug, info, trace, warn};

use crate::codec;
use crate::config::IngestionMetrics;
use crate::error::{HexError, IngestionError};

/// One input line with its 1-based line number
#[derive(Debug)]
struct Line {
    number: u64,
    text: String,
}

/// Replay Source - 从日志文件回放 frame pair
pub struct ReplaySource<R> {
    name: String,
    reader: Option<R>,
    policy: MalformedPolicy,
    distance_marker: String,
    status_marker: String,
    lines_read: u64,
    /// Line read while looking for a status line that must be scanned again
    pending: Option<Line>,
    buf: Vec<u8>,
    metrics: Arc<IngestionMetrics>,
}

impl ReplaySource<BufReader<File>> {
    /// Open a replay log from disk
    ///
    /// # Errors
    /// `IngestionError::ReplayOpen` when the file cannot be opened.
    pub fn open(path: &Path, policy: MalformedPolicy) -> Result<Self, IngestionError> {
        let file = File::open(path).map_err(|source| IngestionError::ReplayOpen {
            path: path.display().to_string(),
            source,
        })?;

        info!(path = %path.display(), policy = ?policy, "Opened replay log");

        Ok(Self::from_reader(
            path.display().to_string(),
            BufReader::new(file),
            policy,
        ))
    }
}

impl<R: BufRead + Seek + Send> ReplaySource<R> {
    /// Build a replay source over any seekable line reader
    pub fn from_reader(name: impl Into<String>, reader: R, policy: MalformedPolicy) -> Self {
        Self {
            name: name.into(),
            reader: Some(reader),
            policy,
            distance_marker: format!("{DISTANCE_PREFIX}:"),
            status_marker: format!("{STATUS_PREFIX}:"),
            lines_read: 0,
            pending: None,
            buf: Vec::new(),
            metrics: Arc::new(IngestionMetrics::new()),
        }
    }

    /// Shared metrics handle
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Next line, from the push-back slot first
    fn next_line(&mut self) -> Result<Option<Line>, IngestionError> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }

        let reader = self.reader.as_mut().ok_or_else(|| IngestionError::Closed {
            name: self.name.clone(),
        })?;

        self.buf.clear();
        if reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        self.lines_read += 1;

        // Serial captures can contain garbage bytes between log lines
        Ok(Some(Line {
            number: self.lines_read,
            text: String::from_utf8_lossy(&self.buf).into_owned(),
        }))
    }

    /// Scan forward to the next complete, valid frame pair
    fn scan(&mut self) -> Result<Option<FramePair>, IngestionError> {
        while let Some(line) = self.next_line()? {
            let Some(distance_hex) = payload_after(&line.text, &self.distance_marker) else {
                continue;
            };

            let distance = match codec::decode_frame(distance_hex) {
                Ok(buffer) => buffer,
                Err(e) => {
                    self.report_malformed(line.number, "distance", &e);
                    continue;
                }
            };

            let Some(next) = self.next_line()? else {
                self.report_orphan(line.number);
                return Ok(None);
            };

            let Some(status_hex) = payload_after(&next.text, &self.status_marker) else {
                self.report_orphan(line.number);
                // The line may itself start a new pair
                self.pending = Some(next);
                continue;
            };

            match codec::decode_frame(status_hex) {
                Ok(status) => {
                    trace!(source = %self.name, line = line.number, "Frame pair decoded");
                    return Ok(Some(FramePair::new(distance, status)));
                }
                Err(e) => {
                    self.report_malformed(next.number, "status", &e);
                }
            }
        }

        Ok(None)
    }

    fn report_malformed(&self, line: u64, buffer: &str, error: &HexError) {
        self.metrics.record_malformed();
        let message = format!("{buffer} buffer: {error}");
        self.report(ContractError::malformed_frame(line, message));
    }

    fn report_orphan(&self, line: u64) {
        self.metrics.record_orphan();
        self.report(ContractError::malformed_frame(line, "distance line without status line"));
    }

    fn report(&self, error: ContractError) {
        counter!("tof_malformed_frames_total").increment(1);

        match self.policy {
            MalformedPolicy::Skip => debug!(source = %self.name, error = %error, "Skipping frame"),
            MalformedPolicy::Report => warn!(source = %self.name, error = %error, "Frame dropped"),
        }
    }
}

/// Text following `marker`, with the separating spaces/tabs removed
fn payload_after<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    line.find(marker)
        .map(|pos| line[pos + marker.len()..].trim_start_matches([' ', '\t']))
}

impl<R: BufRead + Seek + Send> FrameSource for ReplaySource<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn poll_frame(&mut self) -> SourcePoll {
        match self.scan() {
            Ok(Some(frame)) => {
                self.metrics.record_frame();
                SourcePoll::Frame(frame)
            }
            Ok(None) => SourcePoll::Exhausted,
            Err(e) => {
                self.metrics.record_read_failure();
                SourcePoll::Failure(e.to_string())
            }
        }
    }

    fn supports_restart(&self) -> bool {
        true
    }

    fn restart(&mut self) -> Result<(), ContractError> {
        let reader = self.reader.as_mut().ok_or_else(|| IngestionError::Closed {
            name: self.name.clone(),
        })?;

        reader.seek(SeekFrom::Start(0))?;
        self.pending = None;
        self.lines_read = 0;
        self.metrics.record_rewind();

        debug!(source = %self.name, "Replay rewound to start");
        Ok(())
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!(source = %self.name, "Replay source closed");
        }
    }
}
