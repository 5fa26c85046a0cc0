//! Aggregator stage: collapse daily rows into one row per security-week.

use polars::prelude::DataFrame;

use crate::backend::ExecutionBackend;
use crate::data::convert::{frame_to_enriched, weekly_to_frame};
use crate::data::ingest::DataError;
use crate::domain::{EnrichedRecord, WeeklyRecord};
use crate::table::WorkingTable;

/// Fold the enriched table into weekly rows, one per `(SECID, week)`.
///
/// Weeks end on Sunday. Whole-group reduction: barrier first under the
/// distributed backend. The weekly table is a terminal output and is
/// returned as a single frame, never redistributed.
pub fn aggregate_weekly(
    table: &WorkingTable,
    backend: &dyn ExecutionBackend,
) -> Result<DataFrame, DataError> {
    let gathered = backend.materialize(table)?;
    let enriched = frame_to_enriched(&gathered)?;
    let weekly = fold_weeks(&enriched);
    tracing::info!(weeks = weekly.len(), "aggregated weekly rows");
    weekly_to_frame(&weekly)
}

/// Fold records in canonical order into per-week rows.
///
/// Input order makes each `(secid, week)` bucket a consecutive run, so the
/// fold is a single pass: OPEN from the first row, CLOSE from the last,
/// HIGH/LOW extrema, VOLUME sum, and means of the defined indicator values.
pub fn fold_weeks(records: &[EnrichedRecord]) -> Vec<WeeklyRecord> {
    let mut weeks: Vec<WeeklyRecord> = Vec::new();
    let mut current: Option<WeekFold> = None;

    for rec in records {
        let week_end = crate::domain::record::week_end(rec.tradedate);
        match current.as_mut() {
            Some(fold) if fold.secid == rec.secid && fold.week_end == week_end => {
                fold.push(rec);
            }
            _ => {
                if let Some(done) = current.take() {
                    weeks.push(done.finish());
                }
                current = Some(WeekFold::start(rec, week_end));
            }
        }
    }
    if let Some(done) = current.take() {
        weeks.push(done.finish());
    }
    weeks
}

struct WeekFold {
    secid: String,
    week_end: chrono::NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    returns: MeanFold,
    volatilities: MeanFold,
}

impl WeekFold {
    fn start(rec: &EnrichedRecord, week_end: chrono::NaiveDate) -> Self {
        let mut fold = Self {
            secid: rec.secid.clone(),
            week_end,
            open: rec.open,
            high: rec.high,
            low: rec.low,
            close: rec.close,
            volume: rec.volume,
            returns: MeanFold::default(),
            volatilities: MeanFold::default(),
        };
        fold.returns.push(rec.daily_return);
        fold.volatilities.push(rec.volatility_7);
        fold
    }

    fn push(&mut self, rec: &EnrichedRecord) {
        self.high = self.high.max(rec.high);
        self.low = self.low.min(rec.low);
        self.close = rec.close;
        self.volume += rec.volume;
        self.returns.push(rec.daily_return);
        self.volatilities.push(rec.volatility_7);
    }

    fn finish(self) -> WeeklyRecord {
        WeeklyRecord {
            secid: self.secid,
            week_end: self.week_end,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            daily_return: self.returns.mean(),
            volatility_7: self.volatilities.mean(),
        }
    }
}

/// Arithmetic mean over the defined values only; `None` if none were defined.
#[derive(Default)]
struct MeanFold {
    sum: f64,
    count: usize,
}

impl MeanFold {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}
