//! Column contract shared by every pipeline stage.

use polars::prelude::*;

/// Raw input columns.
pub const SECID: &str = "SECID";
pub const TRADEDATE: &str = "TRADEDATE";
pub const OPEN: &str = "OPEN";
pub const HIGH: &str = "HIGH";
pub const LOW: &str = "LOW";
pub const CLOSE: &str = "CLOSE";
pub const VOLUME: &str = "VOLUME";

/// Derived columns added by the indicator engine.
pub const DAILY_RETURN: &str = "DAILY_RETURN";
pub const MA_7: &str = "MA_7";
pub const MA_30: &str = "MA_30";
pub const VOLATILITY_7: &str = "VOLATILITY_7";
pub const VOLUME_CHANGE: &str = "VOLUME_CHANGE";

/// The numeric columns a row must have populated to survive cleaning.
pub const VALUE_COLUMNS: [&str; 5] = [OPEN, HIGH, LOW, CLOSE, VOLUME];

/// Canonical raw table schema.
pub struct RawSchema;

impl RawSchema {
    pub fn schema() -> Schema {
        Schema::from_iter(vec![
            Field::new(SECID.into(), DataType::String),
            Field::new(TRADEDATE.into(), DataType::Date),
            Field::new(OPEN.into(), DataType::Float64),
            Field::new(HIGH.into(), DataType::Float64),
            Field::new(LOW.into(), DataType::Float64),
            Field::new(CLOSE.into(), DataType::Float64),
            Field::new(VOLUME.into(), DataType::Float64),
        ])
    }

    /// Validate a DataFrame against the raw schema.
    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        let expected = Self::schema();
        let actual = df.schema();

        for field in expected.iter_fields() {
            let actual_dtype = actual
                .get(field.name())
                .ok_or_else(|| SchemaError::MissingColumn(field.name().to_string()))?;
            if actual_dtype != field.dtype() {
                return Err(SchemaError::TypeMismatch {
                    column: field.name().to_string(),
                    expected: field.dtype().clone(),
                    actual: actual_dtype.clone(),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("type mismatch in column {column}: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::convert::trades_to_frame;
    use crate::domain::TradeRecord;
    use chrono::NaiveDate;

    fn sample_frame() -> DataFrame {
        trades_to_frame(&[TradeRecord {
            secid: "SBER".into(),
            tradedate: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            open: 270.0,
            high: 275.5,
            low: 268.1,
            close: 272.3,
            volume: 1_500_000.0,
        }])
        .unwrap()
    }

    #[test]
    fn schema_has_all_raw_columns() {
        let schema = RawSchema::schema();
        for name in [SECID, TRADEDATE, OPEN, HIGH, LOW, CLOSE, VOLUME] {
            assert!(schema.contains(name), "missing {name}");
        }
    }

    #[test]
    fn validate_accepts_canonical_frame() {
        let df = sample_frame();
        assert!(RawSchema::validate(&df).is_ok());
    }

    #[test]
    fn validate_rejects_missing_column() {
        let df = sample_frame().drop(VOLUME).unwrap();
        let err = RawSchema::validate(&df).unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn(c) if c == VOLUME));
    }

    #[test]
    fn validate_rejects_wrong_type() {
        let mut df = sample_frame();
        let as_int = df.column(CLOSE).unwrap().cast(&DataType::Int64).unwrap();
        df.with_column(as_int).unwrap();
        let err = RawSchema::validate(&df).unwrap_err();
        assert!(matches!(err, SchemaError::TypeMismatch { column, .. } if column == CLOSE));
    }
}
