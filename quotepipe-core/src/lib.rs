//! QuotePipe Core — OHLCV transformation pipeline.
//!
//! Cleans raw daily trading records, enriches them with per-security
//! technical indicators under strict temporal ordering, and resamples to
//! weekly granularity. Runs either on a single in-memory table (local) or
//! across byte-size partitions on a worker pool (distributed), with
//! identical output in both modes:
//! - Schema and domain record types
//! - Execution backends with an explicit scheduler probe and local fallback
//! - Pure pipeline stages: load, clean, enrich, weekly aggregate
//! - Rolling indicator kernels
//! - Read-only stats reporting and CSV export

pub mod backend;
pub mod data;
pub mod domain;
pub mod export;
pub mod indicators;
pub mod pipeline;
pub mod stages;
pub mod stats;
pub mod table;

pub use backend::{ExecutionBackend, ExecutionMode};
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineOutput};
pub use stats::PipelineStats;
pub use table::WorkingTable;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: pipeline types cross thread boundaries.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::TradeRecord>();
        require_sync::<domain::TradeRecord>();
        require_send::<domain::EnrichedRecord>();
        require_sync::<domain::EnrichedRecord>();
        require_send::<domain::WeeklyRecord>();
        require_sync::<domain::WeeklyRecord>();
        require_send::<WorkingTable>();
        require_sync::<WorkingTable>();
        require_send::<PipelineStats>();
        require_sync::<PipelineStats>();
        require_send::<Box<dyn ExecutionBackend>>();
        require_sync::<Box<dyn ExecutionBackend>>();
    }
}
