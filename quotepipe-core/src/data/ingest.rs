//! CSV ingestion.
//!
//! Reads a delimited file and narrows it to the raw schema columns. The
//! source may carry extra columns (exchange feeds usually do); only the
//! contract set is kept. An unreachable source is fatal here — retrying
//! belongs to the acquisition layer, not the pipeline.

use polars::prelude::*;
use std::path::Path;

use crate::data::schema::{CLOSE, HIGH, LOW, OPEN, SECID, TRADEDATE, VOLUME};

/// Scan a CSV file lazily, selecting and casting the raw schema columns.
///
/// `TRADEDATE` is parsed as a calendar date; price and volume columns are
/// cast to `Float64` so that missing values surface as nulls for the
/// cleaner to drop.
pub fn scan_csv(path: &Path) -> Result<LazyFrame, DataError> {
    if !path.exists() {
        return Err(DataError::SourceUnavailable {
            path: path.display().to_string(),
        });
    }

    let lf = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_try_parse_dates(true)
        .with_infer_schema_length(Some(1000))
        .finish()
        .map_err(|e| DataError::IngestFailed(e.to_string()))?;

    Ok(lf.select([
        col(SECID).cast(DataType::String),
        col(TRADEDATE).cast(DataType::Date),
        col(OPEN).cast(DataType::Float64),
        col(HIGH).cast(DataType::Float64),
        col(LOW).cast(DataType::Float64),
        col(CLOSE).cast(DataType::Float64),
        col(VOLUME).cast(DataType::Float64),
    ]))
}

/// Materialize the scan into a single in-memory frame and validate it
/// against the raw schema.
pub fn read_csv(path: &Path) -> Result<DataFrame, DataError> {
    let df = scan_csv(path)?
        .collect()
        .map_err(|e| DataError::IngestFailed(e.to_string()))?;
    crate::data::schema::RawSchema::validate(&df)?;
    Ok(df)
}

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("input source unavailable: {path}")]
    SourceUnavailable { path: String },

    #[error("ingest failed: {0}")]
    IngestFailed(String),

    #[error("schema error: {0}")]
    Schema(#[from] crate::data::schema::SchemaError),

    #[error("frame operation failed: {0}")]
    Frame(String),
}
