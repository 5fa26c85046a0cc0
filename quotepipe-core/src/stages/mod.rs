//! Pipeline stages.
//!
//! Each stage is a pure function taking a working table plus the injected
//! execution backend and returning a new table. Chaining is explicit
//! composition in [`crate::pipeline::Pipeline::run`]; no stage mutates
//! shared state.

pub mod clean;
pub mod enrich;
pub mod load;
pub mod weekly;

pub use clean::clean;
pub use enrich::enrich;
pub use load::load;
pub use weekly::aggregate_weekly;
