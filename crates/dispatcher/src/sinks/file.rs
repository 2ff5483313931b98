//! CsvSink - appends zone records to a CSV file

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use contracts::{ContractError, RecordSink, ZoneRecord, RECORD_HEADER};
use tracing::{debug, info, instrument, warn};

use crate::error::DispatcherError;

/// Sink that appends records to a CSV file
///
/// The file is opened in append mode and never truncated. The header row is
/// written only when the file is empty, so reopening an existing output keeps
/// exactly one header.
pub struct CsvSink {
    name: String,
    path: PathBuf,
    writer: Option<csv::Writer<File>>,
}

impl CsvSink {
    /// Open (or create) the output file and make sure it has a header
    #[instrument(name = "csv_sink_open", skip(name), fields(path = %path.display()))]
    pub fn open(name: impl Into<String>, path: &Path) -> Result<Self, DispatcherError> {
        let name = name.into();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                DispatcherError::sink_creation(&name, format!("{}: {e}", path.display()))
            })?;

        let existing_len = file.metadata()?.len();
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if existing_len == 0 {
            writer.write_record(RECORD_HEADER)?;
            writer.flush()?;
            info!(sink = %name, path = %path.display(), "Created record file with header");
        } else {
            Self::check_header(&name, path)?;
            debug!(sink = %name, bytes = existing_len, "Appending to existing record file");
        }

        Ok(Self {
            name,
            path: path.to_path_buf(),
            writer: Some(writer),
        })
    }

    /// Output path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Warn when an existing file starts with something other than our header
    fn check_header(name: &str, path: &Path) -> Result<(), DispatcherError> {
        let mut first = String::new();
        BufReader::new(File::open(path)?).read_line(&mut first)?;

        let expected = RECORD_HEADER.join(",");
        if first.trim_end() != expected {
            warn!(
                sink = %name,
                path = %path.display(),
                found = first.trim_end(),
                %expected,
                "Existing file has an unexpected header, appending anyway"
            );
        }
        Ok(())
    }

    fn writer(&mut self) -> Result<&mut csv::Writer<File>, ContractError> {
        let name = &self.name;
        self.writer
            .as_mut()
            .ok_or_else(|| ContractError::sink_write(name, "sink is closed"))
    }
}

impl RecordSink for CsvSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "csv_sink_append",
        skip(self, records),
        fields(sink = %self.name, records = records.len())
    )]
    async fn append(&mut self, records: &[ZoneRecord]) -> Result<(), ContractError> {
        let name = self.name.clone();
        let writer = self.writer()?;

        for record in records {
            writer
                .serialize(record)
                .map_err(|e| ContractError::sink_write(&name, e.to_string()))?;
        }
        // Each batch is durable before the next tick
        writer
            .flush()
            .map_err(|e| ContractError::sink_write(&name, e.to_string()))
    }

    #[instrument(name = "csv_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        let name = self.name.clone();
        self.writer()?
            .flush()
            .map_err(|e| ContractError::sink_write(&name, e.to_string()))
    }

    #[instrument(name = "csv_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        if let Some(mut writer) = self.writer.take() {
            writer
                .flush()
                .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;
            info!(sink = %self.name, path = %self.path.display(), "CsvSink closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timestamp_ms: u64, zone_id: u8, distance_mm: u8, status: u8) -> ZoneRecord {
        ZoneRecord {
            timestamp_ms,
            zone_id,
            distance_mm,
            status,
        }
    }

    #[tokio::test]
    async fn test_new_file_gets_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tof_log.csv");

        let mut sink = CsvSink::open("csv", &path).unwrap();
        sink.append(&[record(4, 0, 5, 5), record(4, 18, 0, 9)])
            .await
            .unwrap();
        sink.close().await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "timestamp_ms,zone_id,distance_mm,status\n4,0,5,5\n4,18,0,9\n"
        );
    }

    #[tokio::test]
    async fn test_reopen_does_not_duplicate_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tof_log.csv");

        let mut first = CsvSink::open("csv", &path).unwrap();
        first.append(&[record(1, 2, 3, 5)]).await.unwrap();
        first.close().await.unwrap();

        let mut second = CsvSink::open("csv", &path).unwrap();
        second.append(&[record(9, 2, 3, 5)]).await.unwrap();
        second.close().await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("timestamp_ms").count(), 1);
        assert!(content.ends_with("1,2,3,5\n9,2,3,5\n"));
    }

    #[tokio::test]
    async fn test_existing_content_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.csv");
        std::fs::write(&path, "legacy line\n").unwrap();

        let mut sink = CsvSink::open("csv", &path).unwrap();
        sink.append(&[record(0, 0, 0, 9)]).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "legacy line\n0,0,0,9\n");
    }

    #[tokio::test]
    async fn test_append_after_close_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvSink::open("csv", &dir.path().join("out.csv")).unwrap();
        sink.close().await.unwrap();

        let err = sink.append(&[record(0, 0, 0, 5)]).await.unwrap_err();
        assert!(!err.is_fatal());
        // closing twice is fine
        assert!(sink.close().await.is_ok());
    }

    #[test]
    fn test_open_in_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = CsvSink::open("csv", &dir.path().join("no/such/dir.csv"));
        let err: ContractError = result.err().unwrap().into();
        assert!(err.is_fatal());
    }
}
