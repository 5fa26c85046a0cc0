//! Pipeline composition: load → clean → enrich → weekly aggregate.

use std::path::Path;
use std::time::Duration;

use polars::prelude::DataFrame;
use thiserror::Error;

use crate::backend::{
    select_backend, BackendOptions, ExecutionBackend, ExecutionMode, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_PARTITION_BYTES,
};
use crate::data::ingest::DataError;
use crate::stages;
use crate::stats::{self, PipelineStats};

/// Configuration surface consumed by the core.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Requested execution mode. The effective backend may differ: an
    /// unreachable scheduler degrades a distributed request to local.
    pub mode: ExecutionMode,
    /// Scheduler `host:port`, required for distributed execution.
    pub scheduler: Option<String>,
    /// Target byte size of one partition.
    pub partition_bytes: usize,
    /// Scheduler probe timeout.
    pub connect_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Local,
            scheduler: None,
            partition_bytes: DEFAULT_PARTITION_BYTES,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Output of a full pipeline run.
///
/// Both frames may be empty when every input row was dropped by the
/// cleaner — an empty-output condition for the caller, not an error.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Daily enriched table: raw columns plus the five derived columns.
    pub daily: DataFrame,
    /// Weekly aggregate, one row per `(SECID, week ending Sunday)`.
    pub weekly: DataFrame,
    /// Stats of the enriched working table.
    pub stats: PipelineStats,
}

/// The transformation pipeline.
///
/// The backend is selected once at construction and injected into every
/// stage; stages themselves are pure functions over the working table.
pub struct Pipeline {
    backend: Box<dyn ExecutionBackend>,
}

impl Pipeline {
    /// Construct a pipeline, probing the scheduler if distributed execution
    /// was requested. Falls back to local on an unavailable scheduler.
    pub fn new(config: &PipelineConfig) -> Self {
        let opts = BackendOptions {
            partition_bytes: config.partition_bytes,
            connect_timeout: config.connect_timeout,
        };
        let backend = select_backend(config.mode, config.scheduler.as_deref(), &opts);
        Self { backend }
    }

    /// The backend actually in effect (after any fallback).
    pub fn backend(&self) -> &dyn ExecutionBackend {
        self.backend.as_ref()
    }

    /// Run the full pipeline on a CSV input.
    pub fn run(&self, input: &Path) -> Result<PipelineOutput, PipelineError> {
        let backend = self.backend.as_ref();
        let table = stages::load(input, backend)?;
        let table = stages::clean(table, backend)?;
        let table = stages::enrich(table, backend)?;
        let stats = stats::report(&table, backend);
        let weekly = stages::aggregate_weekly(&table, backend)?;
        let daily = backend.materialize(&table)?;
        Ok(PipelineOutput {
            daily,
            weekly,
            stats,
        })
    }
}
