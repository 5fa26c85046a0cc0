//! The pipeline's working table.
//!
//! Local execution holds one in-memory frame; distributed execution holds an
//! ordered list of partitions. Partition order is global row order:
//! concatenating partitions front to back reproduces the single-frame view,
//! which is what the synchronization barrier does.

use polars::prelude::*;

use crate::data::ingest::DataError;

/// Working table: one frame, or an ordered set of partitions.
#[derive(Debug, Clone)]
pub enum WorkingTable {
    Single(DataFrame),
    Partitioned(Vec<DataFrame>),
}

impl WorkingTable {
    pub fn row_count(&self) -> usize {
        match self {
            WorkingTable::Single(df) => df.height(),
            WorkingTable::Partitioned(parts) => parts.iter().map(|p| p.height()).sum(),
        }
    }

    pub fn partition_count(&self) -> usize {
        match self {
            WorkingTable::Single(_) => 1,
            WorkingTable::Partitioned(parts) => parts.len(),
        }
    }

    /// Approximate in-memory footprint in bytes.
    pub fn estimated_size(&self) -> usize {
        match self {
            WorkingTable::Single(df) => df.estimated_size(),
            WorkingTable::Partitioned(parts) => parts.iter().map(|p| p.estimated_size()).sum(),
        }
    }

    /// Gather all partitions into one frame, preserving global row order.
    ///
    /// This is the synchronization barrier of the distributed backend; for a
    /// single frame it is a cheap clone of shared column buffers.
    pub fn gather(&self) -> Result<DataFrame, DataError> {
        match self {
            WorkingTable::Single(df) => Ok(df.clone()),
            WorkingTable::Partitioned(parts) => {
                let mut iter = parts.iter();
                let Some(first) = iter.next() else {
                    return Err(DataError::Frame("cannot gather zero partitions".into()));
                };
                let mut out = first.clone();
                for part in iter {
                    out.vstack_mut(part)
                        .map_err(|e| DataError::Frame(e.to_string()))?;
                }
                Ok(out)
            }
        }
    }
}

/// Split a frame into row chunks targeting `partition_bytes` per chunk.
///
/// Always yields at least one partition; global row order is preserved.
pub fn split_frame(df: DataFrame, partition_bytes: usize) -> Vec<DataFrame> {
    let height = df.height();
    if height == 0 {
        return vec![df];
    }
    let size = df.estimated_size().max(1);
    let partitions = size.div_ceil(partition_bytes.max(1)).max(1);
    let rows_per_partition = height.div_ceil(partitions);

    let mut parts = Vec::with_capacity(partitions);
    let mut offset = 0usize;
    while offset < height {
        let len = rows_per_partition.min(height - offset);
        parts.push(df.slice(offset as i64, len));
        offset += len;
    }
    parts
}
