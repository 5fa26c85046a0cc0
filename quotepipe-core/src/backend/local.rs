//! Local backend: one in-memory frame, fully sequential, no barriers.

use std::path::Path;

use polars::prelude::*;

use crate::backend::ExecutionBackend;
use crate::data::ingest::{read_csv, DataError};
use crate::table::WorkingTable;

/// Single-process execution on one in-memory table.
///
/// Everything is already globally visible, so `materialize` is a plain view
/// of the frame and `map_partitions` applies the operation directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend;

impl ExecutionBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    fn requires_barrier(&self) -> bool {
        false
    }

    fn load(&self, path: &Path) -> Result<WorkingTable, DataError> {
        let df = read_csv(path)?;
        tracing::info!(rows = df.height(), "loaded table in memory");
        Ok(WorkingTable::Single(df))
    }

    fn materialize(&self, table: &WorkingTable) -> Result<DataFrame, DataError> {
        table.gather()
    }

    fn distribute(&self, df: DataFrame) -> WorkingTable {
        WorkingTable::Single(df)
    }

    fn map_partitions(
        &self,
        table: WorkingTable,
        op: &(dyn Fn(DataFrame) -> Result<DataFrame, DataError> + Sync),
    ) -> Result<WorkingTable, DataError> {
        let df = table.gather()?;
        Ok(WorkingTable::Single(op(df)?))
    }
}
