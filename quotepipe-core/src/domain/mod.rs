//! Domain types: the row-level contracts shared by every stage.

pub mod record;

pub use record::{EnrichedRecord, TradeRecord, WeeklyRecord};
