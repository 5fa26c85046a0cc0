//! Conversion between the polars working table and typed records.
//!
//! The cleaning stage works on frames; the group-wise computations (indicator
//! enrichment, weekly folding) work on typed records. This module bridges the
//! two with a one-time conversion at each stage boundary.

use chrono::{Duration, NaiveDate};
use polars::prelude::*;

use crate::data::ingest::DataError;
use crate::data::schema::{
    CLOSE, DAILY_RETURN, HIGH, LOW, MA_30, MA_7, OPEN, SECID, TRADEDATE, VOLATILITY_7, VOLUME,
    VOLUME_CHANGE,
};
use crate::domain::{EnrichedRecord, TradeRecord, WeeklyRecord};

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("epoch date is valid")
}

/// Days since the Unix epoch, the physical representation of a polars Date.
pub fn date_to_days(date: NaiveDate) -> i32 {
    (date - epoch()).num_days() as i32
}

/// Inverse of [`date_to_days`].
pub fn days_to_date(days: i32) -> NaiveDate {
    epoch() + Duration::days(days as i64)
}

fn frame_err(e: PolarsError) -> DataError {
    DataError::Frame(e.to_string())
}

fn date_series(name: &str, dates: Vec<i32>) -> Result<Series, DataError> {
    Series::new(name.into(), dates)
        .cast(&DataType::Date)
        .map_err(frame_err)
}

/// Build a raw frame from trade records (test fixtures and re-distribution).
pub fn trades_to_frame(records: &[TradeRecord]) -> Result<DataFrame, DataError> {
    let secids: Vec<String> = records.iter().map(|r| r.secid.clone()).collect();
    let dates: Vec<i32> = records.iter().map(|r| date_to_days(r.tradedate)).collect();

    DataFrame::new(vec![
        Column::Series(Series::new(SECID.into(), secids).into()),
        Column::Series(date_series(TRADEDATE, dates)?.into()),
        Column::Series(Series::new(OPEN.into(), records.iter().map(|r| r.open).collect::<Vec<_>>()).into()),
        Column::Series(Series::new(HIGH.into(), records.iter().map(|r| r.high).collect::<Vec<_>>()).into()),
        Column::Series(Series::new(LOW.into(), records.iter().map(|r| r.low).collect::<Vec<_>>()).into()),
        Column::Series(Series::new(CLOSE.into(), records.iter().map(|r| r.close).collect::<Vec<_>>()).into()),
        Column::Series(Series::new(VOLUME.into(), records.iter().map(|r| r.volume).collect::<Vec<_>>()).into()),
    ])
    .map_err(frame_err)
}

struct RawColumns<'a> {
    secid: &'a StringChunked,
    date: Int32Chunked,
    open: Float64Chunked,
    high: Float64Chunked,
    low: Float64Chunked,
    close: Float64Chunked,
    volume: Float64Chunked,
}

fn raw_columns(df: &DataFrame) -> Result<RawColumns<'_>, DataError> {
    let f64_col = |name: &str| -> Result<Float64Chunked, DataError> {
        Ok(df
            .column(name)
            .map_err(frame_err)?
            .f64()
            .map_err(frame_err)?
            .clone())
    };
    Ok(RawColumns {
        secid: df
            .column(SECID)
            .map_err(frame_err)?
            .str()
            .map_err(frame_err)?,
        date: df
            .column(TRADEDATE)
            .map_err(frame_err)?
            .cast(&DataType::Int32)
            .map_err(frame_err)?
            .i32()
            .map_err(frame_err)?
            .clone(),
        open: f64_col(OPEN)?,
        high: f64_col(HIGH)?,
        low: f64_col(LOW)?,
        close: f64_col(CLOSE)?,
        volume: f64_col(VOLUME)?,
    })
}

fn required<T>(value: Option<T>, column: &str, row: usize) -> Result<T, DataError> {
    value.ok_or_else(|| DataError::Frame(format!("unexpected null in {column} at row {row}")))
}

/// Read a cleaned raw frame into trade records, preserving row order.
///
/// The cleaner guarantees no nulls remain; a null here is a contract
/// violation and surfaces as an error rather than a silent NaN.
pub fn frame_to_trades(df: &DataFrame) -> Result<Vec<TradeRecord>, DataError> {
    let cols = raw_columns(df)?;
    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        records.push(TradeRecord {
            secid: required(cols.secid.get(i), SECID, i)?.to_string(),
            tradedate: days_to_date(required(cols.date.get(i), TRADEDATE, i)?),
            open: required(cols.open.get(i), OPEN, i)?,
            high: required(cols.high.get(i), HIGH, i)?,
            low: required(cols.low.get(i), LOW, i)?,
            close: required(cols.close.get(i), CLOSE, i)?,
            volume: required(cols.volume.get(i), VOLUME, i)?,
        });
    }
    Ok(records)
}

/// Build the enriched daily frame: raw columns plus the five derived columns.
pub fn enriched_to_frame(records: &[EnrichedRecord]) -> Result<DataFrame, DataError> {
    let secids: Vec<String> = records.iter().map(|r| r.secid.clone()).collect();
    let dates: Vec<i32> = records.iter().map(|r| date_to_days(r.tradedate)).collect();

    DataFrame::new(vec![
        Column::Series(Series::new(SECID.into(), secids).into()),
        Column::Series(date_series(TRADEDATE, dates)?.into()),
        Column::Series(Series::new(OPEN.into(), records.iter().map(|r| r.open).collect::<Vec<_>>()).into()),
        Column::Series(Series::new(HIGH.into(), records.iter().map(|r| r.high).collect::<Vec<_>>()).into()),
        Column::Series(Series::new(LOW.into(), records.iter().map(|r| r.low).collect::<Vec<_>>()).into()),
        Column::Series(Series::new(CLOSE.into(), records.iter().map(|r| r.close).collect::<Vec<_>>()).into()),
        Column::Series(Series::new(VOLUME.into(), records.iter().map(|r| r.volume).collect::<Vec<_>>()).into()),
        Column::Series(Series::new(
            DAILY_RETURN.into(),
            records.iter().map(|r| r.daily_return).collect::<Vec<_>>(),
        ).into()),
        Column::Series(Series::new(MA_7.into(), records.iter().map(|r| r.ma_7).collect::<Vec<_>>()).into()),
        Column::Series(Series::new(MA_30.into(), records.iter().map(|r| r.ma_30).collect::<Vec<_>>()).into()),
        Column::Series(Series::new(
            VOLATILITY_7.into(),
            records.iter().map(|r| r.volatility_7).collect::<Vec<_>>(),
        ).into()),
        Column::Series(Series::new(
            VOLUME_CHANGE.into(),
            records.iter().map(|r| r.volume_change).collect::<Vec<_>>(),
        ).into()),
    ])
    .map_err(frame_err)
}

/// Read an enriched frame back into records (input of the weekly fold).
pub fn frame_to_enriched(df: &DataFrame) -> Result<Vec<EnrichedRecord>, DataError> {
    let cols = raw_columns(df)?;
    let opt_f64 = |name: &str| -> Result<Float64Chunked, DataError> {
        Ok(df
            .column(name)
            .map_err(frame_err)?
            .f64()
            .map_err(frame_err)?
            .clone())
    };
    let daily_return = opt_f64(DAILY_RETURN)?;
    let ma_7 = opt_f64(MA_7)?;
    let ma_30 = opt_f64(MA_30)?;
    let volatility_7 = opt_f64(VOLATILITY_7)?;
    let volume_change = opt_f64(VOLUME_CHANGE)?;

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        records.push(EnrichedRecord {
            secid: required(cols.secid.get(i), SECID, i)?.to_string(),
            tradedate: days_to_date(required(cols.date.get(i), TRADEDATE, i)?),
            open: required(cols.open.get(i), OPEN, i)?,
            high: required(cols.high.get(i), HIGH, i)?,
            low: required(cols.low.get(i), LOW, i)?,
            close: required(cols.close.get(i), CLOSE, i)?,
            volume: required(cols.volume.get(i), VOLUME, i)?,
            daily_return: daily_return.get(i),
            ma_7: required(ma_7.get(i), MA_7, i)?,
            ma_30: required(ma_30.get(i), MA_30, i)?,
            volatility_7: volatility_7.get(i),
            volume_change: volume_change.get(i),
        });
    }
    Ok(records)
}

/// Build the weekly aggregate frame. `TRADEDATE` holds the week-end Sunday.
pub fn weekly_to_frame(records: &[WeeklyRecord]) -> Result<DataFrame, DataError> {
    let secids: Vec<String> = records.iter().map(|r| r.secid.clone()).collect();
    let dates: Vec<i32> = records.iter().map(|r| date_to_days(r.week_end)).collect();

    DataFrame::new(vec![
        Column::Series(Series::new(SECID.into(), secids).into()),
        Column::Series(date_series(TRADEDATE, dates)?.into()),
        Column::Series(Series::new(OPEN.into(), records.iter().map(|r| r.open).collect::<Vec<_>>()).into()),
        Column::Series(Series::new(HIGH.into(), records.iter().map(|r| r.high).collect::<Vec<_>>()).into()),
        Column::Series(Series::new(LOW.into(), records.iter().map(|r| r.low).collect::<Vec<_>>()).into()),
        Column::Series(Series::new(CLOSE.into(), records.iter().map(|r| r.close).collect::<Vec<_>>()).into()),
        Column::Series(Series::new(VOLUME.into(), records.iter().map(|r| r.volume).collect::<Vec<_>>()).into()),
        Column::Series(Series::new(
            DAILY_RETURN.into(),
            records.iter().map(|r| r.daily_return).collect::<Vec<_>>(),
        ).into()),
        Column::Series(Series::new(
            VOLATILITY_7.into(),
            records.iter().map(|r| r.volatility_7).collect::<Vec<_>>(),
        ).into()),
    ])
    .map_err(frame_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trades() -> Vec<TradeRecord> {
        vec![
            TradeRecord {
                secid: "SBER".into(),
                tradedate: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                open: 270.0,
                high: 275.5,
                low: 268.1,
                close: 272.3,
                volume: 1_500_000.0,
            },
            TradeRecord {
                secid: "GAZP".into(),
                tradedate: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
                open: 160.0,
                high: 162.0,
                low: 158.5,
                close: 161.1,
                volume: 900_000.0,
            },
        ]
    }

    #[test]
    fn date_days_roundtrip() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(days_to_date(date_to_days(date)), date);
        assert_eq!(date_to_days(epoch()), 0);
    }

    #[test]
    fn trades_roundtrip_through_frame() {
        let trades = sample_trades();
        let df = trades_to_frame(&trades).unwrap();
        assert_eq!(df.height(), 2);
        let back = frame_to_trades(&df).unwrap();
        assert_eq!(back, trades);
    }

    #[test]
    fn enriched_frame_preserves_nulls() {
        let rec = EnrichedRecord {
            secid: "SBER".into(),
            tradedate: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            open: 270.0,
            high: 275.5,
            low: 268.1,
            close: 272.3,
            volume: 1_500_000.0,
            daily_return: None,
            ma_7: 272.3,
            ma_30: 272.3,
            volatility_7: None,
            volume_change: None,
        };
        let df = enriched_to_frame(std::slice::from_ref(&rec)).unwrap();
        assert_eq!(df.column(DAILY_RETURN).unwrap().null_count(), 1);
        let back = frame_to_enriched(&df).unwrap();
        assert_eq!(back, vec![rec]);
    }

    #[test]
    fn empty_record_set_builds_empty_frame() {
        let df = trades_to_frame(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert!(frame_to_trades(&df).unwrap().is_empty());
    }
}
