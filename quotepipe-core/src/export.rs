//! Flat-file export of the pipeline's output tables.

use std::fs::{self, File};
use std::path::Path;

use polars::prelude::*;

/// Write a frame as a headered CSV file, creating parent directories.
///
/// Dates serialize as ISO `YYYY-MM-DD`; undefined indicator values as empty
/// cells.
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    let mut df = df.clone();
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| ExportError::Write(e.to_string()))?;
    tracing::info!(path = %path.display(), rows = df.height(), "wrote output table");
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv write failed: {0}")]
    Write(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::convert::trades_to_frame;
    use crate::data::ingest::read_csv;
    use crate::domain::TradeRecord;
    use chrono::NaiveDate;

    fn sample_frame() -> DataFrame {
        trades_to_frame(&[TradeRecord {
            secid: "SBER".into(),
            tradedate: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            open: 270.0,
            high: 275.5,
            low: 268.1,
            close: 272.3,
            volume: 1_500_000.0,
        }])
        .unwrap()
    }

    #[test]
    fn writes_readable_csv_and_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/daily.csv");
        let df = sample_frame();
        write_csv(&df, &path).unwrap();

        let back = read_csv(&path).unwrap();
        assert!(back.equals_missing(&df));
    }

    #[test]
    fn date_cells_are_iso_formatted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("daily.csv");
        write_csv(&sample_frame(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("2024-01-03"), "csv was: {text}");
    }
}
