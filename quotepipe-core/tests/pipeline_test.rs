//! End-to-end pipeline tests over CSV fixtures.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use polars::prelude::*;
use quotepipe_core::data::convert::frame_to_enriched;
use quotepipe_core::export::write_csv;
use quotepipe_core::{ExecutionMode, Pipeline, PipelineConfig};

fn write_fixture(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut f = File::create(&path).unwrap();
    writeln!(f, "SECID,TRADEDATE,OPEN,HIGH,LOW,CLOSE,VOLUME").unwrap();
    for row in rows {
        writeln!(f, "{row}").unwrap();
    }
    path
}

fn local_pipeline() -> Pipeline {
    Pipeline::new(&PipelineConfig::default())
}

fn assert_approx(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn cleaning_drops_nulls_and_duplicates_deterministically() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        dir.path(),
        "raw.csv",
        &[
            // Duplicate (SBER, 2024-01-02) with different CLOSE: first one survives.
            "SBER,2024-01-02,269.0,273.0,268.0,272.3,1000",
            "SBER,2024-01-02,269.0,273.0,268.0,999.0,1000",
            // Null CLOSE: dropped.
            "SBER,2024-01-03,270.0,274.0,269.0,,1200",
            "GAZP,2024-01-02,160.0,162.0,158.5,161.1,900",
        ],
    );

    let output = local_pipeline().run(&input).unwrap();
    let records = frame_to_enriched(&output.daily).unwrap();

    assert_eq!(records.len(), 2);
    // Sorted by (SECID, TRADEDATE): GAZP before SBER.
    assert_eq!(records[0].secid, "GAZP");
    assert_eq!(records[1].secid, "SBER");
    // Deterministic survivor: the first duplicate in input order.
    assert_approx(records[1].close, 272.3);
}

#[test]
fn three_row_series_produces_reference_indicators() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        dir.path(),
        "raw.csv",
        &[
            "SBER,2024-01-02,99.0,101.0,98.0,100.0,1000",
            "SBER,2024-01-03,100.0,111.0,99.0,110.0,2000",
            "SBER,2024-01-04,110.0,112.0,98.0,99.0,1500",
        ],
    );

    let output = local_pipeline().run(&input).unwrap();
    let records = frame_to_enriched(&output.daily).unwrap();

    assert_eq!(records[0].daily_return, None);
    assert_approx(records[1].daily_return.unwrap(), 10.0);
    assert_approx(records[2].daily_return.unwrap(), -10.0);
    assert_approx(records[2].ma_30, (100.0 + 110.0 + 99.0) / 3.0);
}

#[test]
fn weekly_aggregate_folds_per_security_week() {
    let dir = tempfile::tempdir().unwrap();
    // 2024-01-05 is a Friday; 2024-01-08 the next Monday.
    let input = write_fixture(
        dir.path(),
        "raw.csv",
        &[
            "SBER,2024-01-04,100.0,106.0,99.0,105.0,1000",
            "SBER,2024-01-05,105.0,108.0,104.0,107.0,2000",
            "SBER,2024-01-08,107.0,109.0,103.0,104.0,3000",
        ],
    );

    let output = local_pipeline().run(&input).unwrap();
    let weekly = &output.weekly;
    assert_eq!(weekly.height(), 2);

    let dates: Vec<i32> = weekly
        .column("TRADEDATE")
        .unwrap()
        .cast(&DataType::Int32)
        .unwrap()
        .i32()
        .unwrap()
        .into_no_null_iter()
        .collect();
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let week_ends: Vec<NaiveDate> = dates
        .iter()
        .map(|&d| epoch + chrono::Duration::days(d as i64))
        .collect();
    assert_eq!(week_ends[0], NaiveDate::from_ymd_opt(2024, 1, 7).unwrap());
    assert_eq!(week_ends[1], NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());

    let volumes: Vec<f64> = weekly
        .column("VOLUME")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_approx(volumes[0], 3000.0); // 1000 + 2000
    assert_approx(volumes[1], 3000.0);

    let opens: Vec<f64> = weekly
        .column("OPEN")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_approx(opens[0], 100.0); // first chronologically
    let closes: Vec<f64> = weekly
        .column("CLOSE")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_approx(closes[0], 107.0); // last chronologically
}

#[test]
fn pipeline_is_idempotent_on_its_own_daily_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        dir.path(),
        "raw.csv",
        &[
            "GAZP,2024-01-02,160.0,162.0,158.5,161.1,900",
            "GAZP,2024-01-03,161.0,163.0,160.0,162.5,950",
            "SBER,2024-01-02,269.0,273.0,268.0,272.3,1000",
            "SBER,2024-01-03,272.0,275.0,271.0,274.1,1100",
        ],
    );

    let pipeline = local_pipeline();
    let first = pipeline.run(&input).unwrap();

    let daily_path = dir.path().join("daily.csv");
    write_csv(&first.daily, &daily_path).unwrap();
    let second = pipeline.run(&daily_path).unwrap();

    assert!(second.daily.equals_missing(&first.daily));
    assert!(second.weekly.equals_missing(&first.weekly));
}

#[test]
fn all_invalid_input_yields_empty_outputs_without_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        dir.path(),
        "raw.csv",
        &[
            "SBER,2024-01-02,269.0,273.0,268.0,,1000",
            "SBER,2024-01-03,270.0,274.0,269.0,,1200",
        ],
    );

    let output = local_pipeline().run(&input).unwrap();
    assert_eq!(output.daily.height(), 0);
    assert_eq!(output.weekly.height(), 0);
    assert_eq!(output.stats.total_rows, 0);
}

#[test]
fn unreachable_scheduler_completes_with_local_identity() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        dir.path(),
        "raw.csv",
        &["SBER,2024-01-02,269.0,273.0,268.0,272.3,1000"],
    );

    let config = PipelineConfig {
        mode: ExecutionMode::Distributed,
        scheduler: Some("127.0.0.1:9".into()),
        connect_timeout: Duration::from_millis(200),
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(&config);
    let output = pipeline.run(&input).unwrap();

    assert_eq!(output.stats.backend, "local");
    assert_eq!(output.stats.partitions, 1);
    assert_eq!(output.daily.height(), 1);
}
