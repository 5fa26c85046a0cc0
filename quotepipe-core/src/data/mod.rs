//! Data ingestion, schema contract, and frame/record conversion.

pub mod convert;
pub mod ingest;
pub mod schema;

pub use ingest::{read_csv, scan_csv, DataError};
pub use schema::{RawSchema, SchemaError};
