//! Read-only introspection over the pipeline's current table.

use std::fmt;

use serde::Serialize;

use crate::backend::ExecutionBackend;
use crate::table::WorkingTable;

/// Snapshot of the working table: row count, partition count, approximate
/// memory footprint, and the identity of the backend in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineStats {
    pub total_rows: usize,
    pub partitions: usize,
    pub memory_bytes: usize,
    pub backend: String,
}

/// Compute stats without mutating the table. Callable after any stage.
pub fn report(table: &WorkingTable, backend: &dyn ExecutionBackend) -> PipelineStats {
    PipelineStats {
        total_rows: table.row_count(),
        partitions: table.partition_count(),
        memory_bytes: table.estimated_size(),
        backend: backend.name().to_string(),
    }
}

impl fmt::Display for PipelineStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rows:       {}", self.total_rows)?;
        writeln!(f, "partitions: {}", self.partitions)?;
        writeln!(
            f,
            "memory:     {:.2} MB",
            self.memory_bytes as f64 / (1024.0 * 1024.0)
        )?;
        write!(f, "backend:    {}", self.backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use crate::data::convert::trades_to_frame;
    use crate::domain::TradeRecord;
    use chrono::NaiveDate;

    #[test]
    fn reports_local_table_shape() {
        let df = trades_to_frame(&[TradeRecord {
            secid: "SBER".into(),
            tradedate: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            open: 270.0,
            high: 275.5,
            low: 268.1,
            close: 272.3,
            volume: 1_500_000.0,
        }])
        .unwrap();
        let table = WorkingTable::Single(df);
        let stats = report(&table, &LocalBackend);
        assert_eq!(stats.total_rows, 1);
        assert_eq!(stats.partitions, 1);
        assert_eq!(stats.backend, "local");
        assert!(stats.memory_bytes > 0);
    }

    #[test]
    fn display_renders_backend_identity() {
        let stats = PipelineStats {
            total_rows: 10,
            partitions: 2,
            memory_bytes: 2 * 1024 * 1024,
            backend: "distributed".into(),
        };
        let text = stats.to_string();
        assert!(text.contains("rows:       10"));
        assert!(text.contains("backend:    distributed"));
    }
}
