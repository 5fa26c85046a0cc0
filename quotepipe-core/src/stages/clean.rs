//! Cleaner stage: drop invalid rows, deduplicate, canonical temporal order.

use polars::prelude::*;

use crate::backend::ExecutionBackend;
use crate::data::ingest::DataError;
use crate::data::schema::{CLOSE, HIGH, LOW, OPEN, SECID, TRADEDATE, VOLUME};
use crate::table::WorkingTable;

/// Clean the working table.
///
/// Row-level null filtering is partition-local and runs concurrently under
/// the distributed backend. Deduplication and the per-security sort need
/// global group-key affinity — rows of one security must reside together —
/// so they run behind the barrier and the result is redistributed.
///
/// Runs identically in both execution modes: same survivors, same order.
pub fn clean(
    table: WorkingTable,
    backend: &dyn ExecutionBackend,
) -> Result<WorkingTable, DataError> {
    let rows_before = table.row_count();
    let filtered = backend.map_partitions(table, &drop_invalid_rows)?;
    let gathered = backend.materialize(&filtered)?;
    let cleaned = canonical_order(gathered)?;
    tracing::info!(
        rows_before,
        rows_after = cleaned.height(),
        "cleaned and ordered table"
    );
    Ok(backend.distribute(cleaned))
}

/// Drop rows with a null key or a null OHLCV value. Row-local, so safe to
/// run per partition.
fn drop_invalid_rows(df: DataFrame) -> Result<DataFrame, DataError> {
    df.lazy()
        .drop_nulls(Some(vec![
            col(SECID),
            col(TRADEDATE),
            col(OPEN),
            col(HIGH),
            col(LOW),
            col(CLOSE),
            col(VOLUME),
        ]))
        .collect()
        .map_err(|e| DataError::Frame(e.to_string()))
}

/// Stable sort by `(SECID, TRADEDATE)`, then keep the first surviving row
/// of each key pair. Stability makes the survivor the first in input order,
/// so deduplication is deterministic.
fn canonical_order(df: DataFrame) -> Result<DataFrame, DataError> {
    df.lazy()
        .sort(
            [SECID, TRADEDATE],
            SortMultipleOptions::default()
                .with_order_descending_multi([false, false])
                .with_maintain_order(true),
        )
        .unique_stable(
            Some(vec![SECID.into(), TRADEDATE.into()]),
            UniqueKeepStrategy::First,
        )
        .collect()
        .map_err(|e| DataError::Frame(e.to_string()))
}
