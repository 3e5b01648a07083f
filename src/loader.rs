//! CSV log ingestion
//!
//! Loads `timestamp,user_id,action_id` lines from flat CSV files into a
//! fully indexed [`LogSnapshot`]. Parsing and indexing happen in a single
//! pass: every record is pushed into a [`SnapshotBuilder`] as it is read.
//!
//! A load either succeeds completely or fails with the first offending file
//! and line. A failed load never yields a snapshot, so the query engine can
//! never observe partially indexed state.

use crate::store::{LogRecord, LogSnapshot, SnapshotBuilder};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while loading log files
#[derive(Debug, Error)]
pub enum LoadError {
    /// I/O operation failed
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed input line; aborts the whole load
    #[error("{path:?}, line {line}: {kind}")]
    Parse {
        path: PathBuf,
        line: u64,
        kind: ParseErrorKind,
    },

    /// No `*.csv` files found under the data directory
    #[error("no .csv files found in {dir:?}")]
    NoDataFiles { dir: PathBuf },

    /// Configured record cap exceeded
    #[error("record cap of {limit} exceeded")]
    RecordCap { limit: usize },
}

/// What exactly was wrong with a rejected line
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Wrong number of comma-separated fields
    #[error("expected 3 fields, found {0}")]
    FieldCount(usize),

    /// Timestamp field is not a decimal integer
    #[error("invalid timestamp {0:?}")]
    Timestamp(String),

    /// Action field is not a valid UUID
    #[error("invalid action id {0:?}")]
    ActionId(String),

    /// The CSV reader itself rejected the line
    #[error("malformed CSV: {0}")]
    Csv(String),
}

/// Result of a completed load
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Number of files read
    pub files: usize,
    /// Number of records loaded
    pub records: usize,
    /// Wall-clock load time in milliseconds
    pub elapsed_ms: u64,
}

/// CSV log loader
///
/// Reads one or more files of `timestamp,user_id,action_id` lines (no header
/// row, no escaping) and builds a snapshot. An optional record cap bounds
/// memory on untrusted inputs.
#[derive(Debug, Clone, Default)]
pub struct LogLoader {
    /// Abort once this many records have been read (None = unlimited)
    max_records: Option<usize>,
}

impl LogLoader {
    /// Create a loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cap on the number of records a load may produce
    pub fn with_max_records(mut self, limit: usize) -> Self {
        self.max_records = Some(limit);
        self
    }

    /// Load every `*.csv` file under `dir` into one snapshot
    ///
    /// Files are read in name order, so record insertion order is
    /// reproducible. A directory without any `.csv` file is an error, not an
    /// empty snapshot.
    pub fn load_dir(&self, dir: &Path) -> Result<(LogSnapshot, LoadReport), LoadError> {
        let start = Instant::now();

        let entries = std::fs::read_dir(dir).map_err(|e| LoadError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().map(|ext| ext == "csv").unwrap_or(false))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(LoadError::NoDataFiles {
                dir: dir.to_path_buf(),
            });
        }

        let mut builder = SnapshotBuilder::new();
        for path in &paths {
            let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
                path: path.clone(),
                source: e,
            })?;
            self.load_reader(file, path, &mut builder)?;
        }

        let report = LoadReport {
            files: paths.len(),
            records: builder.len(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            files = report.files,
            records = report.records,
            elapsed_ms = report.elapsed_ms,
            "log load complete"
        );

        Ok((builder.finish(), report))
    }

    /// Load a single file into one snapshot
    pub fn load_file(&self, path: &Path) -> Result<(LogSnapshot, LoadReport), LoadError> {
        let start = Instant::now();

        let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut builder = SnapshotBuilder::new();
        self.load_reader(file, path, &mut builder)?;

        let report = LoadReport {
            files: 1,
            records: builder.len(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        };

        Ok((builder.finish(), report))
    }

    /// Read records from `reader` into `builder`, attributing errors to `path`
    pub fn load_reader<R: Read>(
        &self,
        reader: R,
        path: &Path,
        builder: &mut SnapshotBuilder,
    ) -> Result<(), LoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        for result in csv_reader.records() {
            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(0);
                    return Err(LoadError::Parse {
                        path: path.to_path_buf(),
                        line,
                        kind: ParseErrorKind::Csv(e.to_string()),
                    });
                }
            };

            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let parsed = parse_record(&record).map_err(|kind| LoadError::Parse {
                path: path.to_path_buf(),
                line,
                kind,
            })?;

            if let Some(limit) = self.max_records {
                if builder.len() >= limit {
                    return Err(LoadError::RecordCap { limit });
                }
            }

            builder.push(parsed);
        }

        Ok(())
    }
}

/// Parse one raw CSV record into a [`LogRecord`]
fn parse_record(record: &csv::StringRecord) -> Result<LogRecord, ParseErrorKind> {
    if record.len() != 3 {
        return Err(ParseErrorKind::FieldCount(record.len()));
    }

    let timestamp = record[0]
        .trim()
        .parse::<i64>()
        .map_err(|_| ParseErrorKind::Timestamp(record[0].to_string()))?;

    let action_id = Uuid::parse_str(record[2].trim())
        .map_err(|_| ParseErrorKind::ActionId(record[2].to_string()))?;

    Ok(LogRecord::new(timestamp, &record[1], action_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const ACTION_A: &str = "9e6ded42-5b55-bfa5-f493-392b6bc53bb1";
    const ACTION_B: &str = "11111111-2222-3333-4444-555555555555";

    fn load_str(data: &str) -> Result<LogSnapshot, LoadError> {
        let mut builder = SnapshotBuilder::new();
        LogLoader::new().load_reader(data.as_bytes(), Path::new("test.csv"), &mut builder)?;
        Ok(builder.finish())
    }

    #[test]
    fn test_load_valid_lines() {
        let data = format!(
            "10,u1,{ACTION_A}\n\
             20,u1,{ACTION_B}\n\
             30,u2,{ACTION_A}\n"
        );

        let snapshot = load_str(&data).unwrap();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.distinct_user_count(), 2);
        assert_eq!(snapshot.action_count(&Uuid::parse_str(ACTION_A).unwrap()), 2);
        assert_eq!(
            snapshot.user_action_count("u1", &Uuid::parse_str(ACTION_B).unwrap()),
            1
        );
    }

    #[test]
    fn test_wrong_field_count_aborts() {
        let data = format!("10,u1,{ACTION_A}\n20,u1\n");

        let err = load_str(&data).unwrap_err();
        match err {
            LoadError::Parse { line, kind, .. } => {
                assert_eq!(line, 2);
                assert_eq!(kind, ParseErrorKind::FieldCount(2));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_timestamp_aborts() {
        let data = format!("not-a-number,u1,{ACTION_A}\n");

        let err = load_str(&data).unwrap_err();
        match err {
            LoadError::Parse { line, kind, .. } => {
                assert_eq!(line, 1);
                assert_eq!(kind, ParseErrorKind::Timestamp("not-a-number".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_action_id_aborts() {
        let data = "10,u1,not-a-uuid\n";

        let err = load_str(data).unwrap_err();
        match err {
            LoadError::Parse { kind, .. } => {
                assert_eq!(kind, ParseErrorKind::ActionId("not-a-uuid".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_dir_merges_files_in_name_order() {
        let dir = tempdir().unwrap();

        let mut file_b = std::fs::File::create(dir.path().join("b.csv")).unwrap();
        writeln!(file_b, "20,u2,{ACTION_A}").unwrap();

        let mut file_a = std::fs::File::create(dir.path().join("a.csv")).unwrap();
        writeln!(file_a, "10,u1,{ACTION_A}").unwrap();

        // Non-csv files are ignored
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let (snapshot, report) = LogLoader::new().load_dir(dir.path()).unwrap();

        assert_eq!(report.files, 2);
        assert_eq!(report.records, 2);
        assert_eq!(snapshot.len(), 2);

        // a.csv before b.csv regardless of creation order
        assert_eq!(snapshot.records()[0].user_id, "u1");
        assert_eq!(snapshot.records()[1].user_id, "u2");
    }

    #[test]
    fn test_load_dir_without_csv_files() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let err = LogLoader::new().load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::NoDataFiles { .. }));
    }

    #[test]
    fn test_record_cap_aborts() {
        let data = format!(
            "10,u1,{ACTION_A}\n\
             20,u1,{ACTION_A}\n\
             30,u1,{ACTION_A}\n"
        );

        let mut builder = SnapshotBuilder::new();
        let err = LogLoader::new()
            .with_max_records(2)
            .load_reader(data.as_bytes(), Path::new("test.csv"), &mut builder)
            .unwrap_err();

        assert!(matches!(err, LoadError::RecordCap { limit: 2 }));
    }

    #[test]
    fn test_load_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.csv");
        std::fs::write(&path, format!("10,u1,{ACTION_A}\n")).unwrap();

        let (snapshot, report) = LogLoader::new().load_file(&path).unwrap();

        assert_eq!(report.files, 1);
        assert_eq!(snapshot.len(), 1);
    }
}
