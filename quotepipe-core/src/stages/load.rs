//! Loader stage: materialize the raw table from a CSV source.

use std::path::Path;

use crate::backend::ExecutionBackend;
use crate::data::ingest::DataError;
use crate::table::WorkingTable;

/// Load every input row unchanged into the backend's table shape.
///
/// Local holds one in-memory frame; distributed splits into byte-size
/// partitions. An unreachable source is fatal and propagated — retry
/// belongs to the acquisition collaborator, not here.
pub fn load(path: &Path, backend: &dyn ExecutionBackend) -> Result<WorkingTable, DataError> {
    let table = backend.load(path)?;
    tracing::info!(
        rows = table.row_count(),
        partitions = table.partition_count(),
        backend = backend.name(),
        "raw table loaded"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;

    #[test]
    fn missing_input_propagates_fatally() {
        let err = load(Path::new("/nonexistent/raw.csv"), &LocalBackend).unwrap_err();
        assert!(matches!(err, DataError::SourceUnavailable { .. }));
    }
}
