//! Trade records — the fundamental row types of the pipeline.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// One raw daily trading record for a single security.
///
/// Produced by the loader and immutable once read. After cleaning, at most
/// one record exists per `(secid, tradedate)` pair and records within a
/// security are sorted by `tradedate` ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub secid: String,
    pub tradedate: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl TradeRecord {
    /// Basic OHLCV sanity check: high >= low, positive prices, non-negative volume.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.open > 0.0
            && self.high > 0.0
            && self.low > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }

    /// The Sunday that closes this record's calendar week.
    ///
    /// Weekly aggregation buckets rows by this date; a Sunday maps to itself.
    pub fn week_end(&self) -> NaiveDate {
        week_end(self.tradedate)
    }
}

/// The Sunday that closes the calendar week containing `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    let days_to_sunday = 6 - date.weekday().num_days_from_monday() as i64;
    date + Duration::days(days_to_sunday)
}

/// A daily record with the five derived indicator columns.
///
/// Replaces `TradeRecord` in the working table after enrichment. `None`
/// means the value is undefined at that row (e.g. the first return of a
/// security, or a volatility window with fewer than two returns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub secid: String,
    pub tradedate: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub daily_return: Option<f64>,
    pub ma_7: f64,
    pub ma_30: f64,
    pub volatility_7: Option<f64>,
    pub volume_change: Option<f64>,
}

/// One `(secid, week)` row of the weekly aggregate.
///
/// `week_end` is the Sunday closing the week. Terminal output: never fed
/// back into the daily pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRecord {
    pub secid: String,
    pub week_end: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub daily_return: Option<f64>,
    pub volatility_7: Option<f64>,
}
