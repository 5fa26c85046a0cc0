//! Distributed backend: byte-size partitions processed on a worker pool.
//!
//! Partition-local operations run concurrently via rayon with no ordering
//! guarantee between partitions. Whole-group temporal computations must call
//! `materialize` first — the blocking barrier that gathers every partition
//! into one globally ordered frame. The gathered computation runs on the
//! coordinating process; parallelism buys storage/IO concurrency before and
//! after the barrier, not inside the group computation itself.

use std::path::Path;

use polars::prelude::*;
use rayon::prelude::*;

use crate::backend::scheduler::SchedulerHandle;
use crate::backend::ExecutionBackend;
use crate::data::ingest::{read_csv, DataError};
use crate::table::{split_frame, WorkingTable};

/// Partitioned execution coordinated by a verified scheduler.
///
/// Constructed only from a successful [`SchedulerProbe`]; an unreachable
/// scheduler never produces this backend.
///
/// [`SchedulerProbe`]: crate::backend::SchedulerProbe
#[derive(Debug, Clone)]
pub struct DistributedBackend {
    scheduler: SchedulerHandle,
    partition_bytes: usize,
}

impl DistributedBackend {
    pub fn new(scheduler: SchedulerHandle, partition_bytes: usize) -> Self {
        Self {
            scheduler,
            partition_bytes,
        }
    }

    pub fn scheduler(&self) -> &SchedulerHandle {
        &self.scheduler
    }
}

impl ExecutionBackend for DistributedBackend {
    fn name(&self) -> &'static str {
        "distributed"
    }

    fn requires_barrier(&self) -> bool {
        true
    }

    fn load(&self, path: &Path) -> Result<WorkingTable, DataError> {
        let df = read_csv(path)?;
        let parts = split_frame(df, self.partition_bytes);
        tracing::info!(
            partitions = parts.len(),
            scheduler = %self.scheduler.address(),
            "loaded table as partitions"
        );
        Ok(WorkingTable::Partitioned(parts))
    }

    fn materialize(&self, table: &WorkingTable) -> Result<DataFrame, DataError> {
        tracing::debug!(
            partitions = table.partition_count(),
            "synchronization barrier: gathering partitions"
        );
        table.gather()
    }

    fn distribute(&self, df: DataFrame) -> WorkingTable {
        WorkingTable::Partitioned(split_frame(df, self.partition_bytes))
    }

    fn map_partitions(
        &self,
        table: WorkingTable,
        op: &(dyn Fn(DataFrame) -> Result<DataFrame, DataError> + Sync),
    ) -> Result<WorkingTable, DataError> {
        let parts = match table {
            WorkingTable::Single(df) => vec![df],
            WorkingTable::Partitioned(parts) => parts,
        };
        let mapped: Vec<DataFrame> = parts
            .into_par_iter()
            .map(op)
            .collect::<Result<Vec<_>, DataError>>()?;
        Ok(WorkingTable::Partitioned(mapped))
    }
}
