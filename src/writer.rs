use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::error::{Result, ScrapeError};
use crate::record::Record;

/// What a completed write produced.
#[derive(Debug, Clone)]
pub struct WriteReport {
    pub path: PathBuf,
    pub count: usize,
    pub finished_at: DateTime<Local>,
}

impl WriteReport {
    /// `Wrote data/ibex35.json with 35 companies at Mon Oct 19 18:04:05 2026`
    pub fn summary(&self) -> String {
        format!(
            "Wrote {} with {} companies at {}",
            self.path.display(),
            self.count,
            self.finished_at.format("%a %b %e %H:%M:%S %Y"),
        )
    }
}

/// Replaces `path` with the snapshot as a JSON array. Non-ASCII is written as-is.
pub fn write_snapshot(path: &Path, records: &[Record]) -> Result<WriteReport> {
    let io_err = |source: std::io::Error| ScrapeError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer(&mut out, records)?;
    out.flush().map_err(io_err)?;

    let report = WriteReport {
        path: path.to_path_buf(),
        count: records.len(),
        finished_at: Local::now(),
    };
    info!(path = %report.path.display(), count = report.count, "snapshot written");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn writes_array_with_keys_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("ibex35.json");
        let mut record = Record::new("Telefónica", 2.5e10, -0.4);
        record.ticker = "T".into();

        let report = write_snapshot(&path, &[record]).unwrap();
        assert_eq!(report.count, 1);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Telefónica"));
        assert!(raw.starts_with(r#"[{"name":"Telefónica","size":25000000000.0,"change":-0.4,"ticker":"T"}"#));

        let parsed: Value = serde_json::from_str(&raw).unwrap();
        let keys: Vec<&String> = parsed[0].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["name", "size", "change", "ticker"]);
    }

    #[test]
    fn overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "[1,2,3,4,5,6,7,8,9,10]").unwrap();

        write_snapshot(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn summary_mentions_path_and_count() {
        let report = WriteReport {
            path: PathBuf::from("data/ibex35.json"),
            count: 35,
            finished_at: Local::now(),
        };
        let line = report.summary();
        assert!(line.starts_with("Wrote data/ibex35.json with 35 companies at "));
    }
}
