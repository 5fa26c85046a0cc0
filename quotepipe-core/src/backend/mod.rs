//! Execution backends.
//!
//! Every stage delegates its distribution strategy to a single injected
//! `ExecutionBackend` instead of re-deciding per method. Both variants share
//! one output contract: running the pipeline locally or distributed yields
//! numerically identical tables (backend transparency).

pub mod distributed;
pub mod local;
pub mod scheduler;

use std::path::Path;
use std::time::Duration;

use polars::prelude::*;

pub use distributed::DistributedBackend;
pub use local::LocalBackend;
pub use scheduler::{SchedulerHandle, SchedulerProbe};

use crate::data::ingest::DataError;
use crate::table::WorkingTable;

/// Default partition byte budget, matching a 64 MB block size.
pub const DEFAULT_PARTITION_BYTES: usize = 64 * 1024 * 1024;

/// Default scheduler probe timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Requested execution mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Local,
    Distributed,
}

/// Tuning knobs for backend construction.
#[derive(Debug, Clone)]
pub struct BackendOptions {
    /// Target byte size of one partition under the distributed backend.
    pub partition_bytes: usize,
    /// Timeout for the scheduler connection probe.
    pub connect_timeout: Duration,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            partition_bytes: DEFAULT_PARTITION_BYTES,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Strategy interface consulted by every stage.
///
/// `materialize` is the synchronization barrier: it gathers all partitions
/// into one globally ordered frame. It is the only cross-partition ordering
/// guarantee the design provides; partition-local operations run with no
/// ordering between partitions.
pub trait ExecutionBackend: Send + Sync {
    /// Backend identity string, reported by the stats reporter.
    fn name(&self) -> &'static str;

    /// Whether whole-group temporal computations must gather partitions first.
    fn requires_barrier(&self) -> bool;

    /// Materialize a raw table from a CSV source, unchanged in values.
    fn load(&self, path: &Path) -> Result<WorkingTable, DataError>;

    /// Gather the table into one globally ordered frame (barrier).
    fn materialize(&self, table: &WorkingTable) -> Result<DataFrame, DataError>;

    /// Scatter a frame back into this backend's table shape.
    fn distribute(&self, df: DataFrame) -> WorkingTable;

    /// Apply a partition-local operation to every partition.
    ///
    /// The operation must be row-local (no cross-partition state): filters
    /// and projections qualify, group-wise computations do not.
    fn map_partitions(
        &self,
        table: WorkingTable,
        op: &(dyn Fn(DataFrame) -> Result<DataFrame, DataError> + Sync),
    ) -> Result<WorkingTable, DataError>;
}

/// Select the backend once, at pipeline construction.
///
/// Requesting distributed execution probes the scheduler first. An
/// unavailable scheduler (including a missing address) degrades to local
/// execution with a warning — a deliberate fallback, not an error.
pub fn select_backend(
    mode: ExecutionMode,
    scheduler_address: Option<&str>,
    opts: &BackendOptions,
) -> Box<dyn ExecutionBackend> {
    match mode {
        ExecutionMode::Local => Box::new(LocalBackend),
        ExecutionMode::Distributed => {
            let probe = match scheduler_address {
                Some(addr) => SchedulerProbe::connect(addr, opts.connect_timeout),
                None => SchedulerProbe::Unavailable {
                    reason: "no scheduler address configured".into(),
                },
            };
            match probe {
                SchedulerProbe::Connected(handle) => {
                    tracing::info!(scheduler = %handle.address(), "connected to scheduler");
                    Box::new(DistributedBackend::new(handle, opts.partition_bytes))
                }
                SchedulerProbe::Unavailable { reason } => {
                    tracing::warn!(%reason, "scheduler unavailable, falling back to local execution");
                    Box::new(LocalBackend)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_mode_selects_local() {
        let backend = select_backend(ExecutionMode::Local, None, &BackendOptions::default());
        assert_eq!(backend.name(), "local");
        assert!(!backend.requires_barrier());
    }

    #[test]
    fn distributed_without_address_falls_back_to_local() {
        let backend = select_backend(ExecutionMode::Distributed, None, &BackendOptions::default());
        assert_eq!(backend.name(), "local");
    }

    #[test]
    fn distributed_with_dead_scheduler_falls_back_to_local() {
        let opts = BackendOptions {
            connect_timeout: Duration::from_millis(200),
            ..BackendOptions::default()
        };
        let backend = select_backend(ExecutionMode::Distributed, Some("127.0.0.1:9"), &opts);
        assert_eq!(backend.name(), "local");
    }

    #[test]
    fn distributed_with_live_scheduler_selects_distributed() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let backend = select_backend(
            ExecutionMode::Distributed,
            Some(&addr),
            &BackendOptions::default(),
        );
        assert_eq!(backend.name(), "distributed");
        assert!(backend.requires_barrier());
    }
}
