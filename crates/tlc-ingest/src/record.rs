//! Typed rows and batches
//!
//! The source reader turns each CSV record into a [`Row`] of statically
//! typed [`Value`]s, ordered by the schema's column order. Coercion happens
//! here, at decode time; a field that does not conform to its declared
//! column type fails the whole run.

use chrono::NaiveDateTime;
use tlc_common::{IngestError, Result};

use crate::schema::ColumnType;

/// Timestamp format used by the TLC archive files
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One typed field value
///
/// Every variant is nullable: the archive files leave fields empty in any
/// column, and the destination columns are declared nullable to match.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
    Timestamp(Option<NaiveDateTime>),
}

impl Value {
    /// Coerce a raw CSV field to the declared column type
    ///
    /// An empty field is NULL for every type. `column` and `line` feed the
    /// diagnostic when coercion fails.
    pub fn coerce(raw: &str, ty: ColumnType, column: &str, line: u64) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Value::null(ty));
        }

        let fail = || IngestError::TypeCoercion {
            column: column.to_string(),
            line,
            value: raw.to_string(),
            expected: ty.describe(),
        };

        match ty {
            ColumnType::Integer => trimmed
                .parse::<i64>()
                .map(|v| Value::Integer(Some(v)))
                .map_err(|_| fail()),
            ColumnType::Float => trimmed
                .parse::<f64>()
                .map(|v| Value::Float(Some(v)))
                .map_err(|_| fail()),
            ColumnType::Text => Ok(Value::Text(Some(trimmed.to_string()))),
            ColumnType::Timestamp => NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT)
                .map(|v| Value::Timestamp(Some(v)))
                .map_err(|_| fail()),
        }
    }

    /// NULL value of the given type
    pub fn null(ty: ColumnType) -> Self {
        match ty {
            ColumnType::Integer => Value::Integer(None),
            ColumnType::Float => Value::Float(None),
            ColumnType::Text => Value::Text(None),
            ColumnType::Timestamp => Value::Timestamp(None),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::Integer(None) | Value::Float(None) | Value::Text(None) | Value::Timestamp(None)
        )
    }
}

/// One decoded row, values in schema column order
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }
}

/// A fixed-size group of rows processed as one unit
///
/// Batches are produced in source order and consumed exactly once; the
/// reader never retains a batch after handing it out.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Zero-based batch index within the run
    pub index: usize,
    pub rows: Vec<Row>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_integer() {
        let v = Value::coerce("42", ColumnType::Integer, "id", 1).unwrap();
        assert_eq!(v, Value::Integer(Some(42)));

        let v = Value::coerce("-7", ColumnType::Integer, "id", 1).unwrap();
        assert_eq!(v, Value::Integer(Some(-7)));
    }

    #[test]
    fn test_coerce_integer_rejects_fraction() {
        // A fractional string in an integer column is an error, not a
        // truncation.
        let err = Value::coerce("1.5", ColumnType::Integer, "passenger_count", 3).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("passenger_count"));
        assert!(msg.contains("1.5"));
    }

    #[test]
    fn test_coerce_float() {
        let v = Value::coerce("12.35", ColumnType::Float, "fare_amount", 1).unwrap();
        assert_eq!(v, Value::Float(Some(12.35)));
    }

    #[test]
    fn test_coerce_timestamp() {
        let v = Value::coerce(
            "2021-01-01 00:15:56",
            ColumnType::Timestamp,
            "tpep_pickup_datetime",
            1,
        )
        .unwrap();
        match v {
            Value::Timestamp(Some(ts)) => {
                assert_eq!(ts.format(TIMESTAMP_FORMAT).to_string(), "2021-01-01 00:15:56");
            }
            other => panic!("expected timestamp, got {:?}", other),
        }
    }

    #[test]
    fn test_coerce_bad_timestamp() {
        let err = Value::coerce("01/01/2021", ColumnType::Timestamp, "pickup", 9).unwrap_err();
        assert!(err.to_string().contains("timestamp"));
    }

    #[test]
    fn test_empty_field_is_null_for_every_type() {
        for ty in [
            ColumnType::Integer,
            ColumnType::Float,
            ColumnType::Text,
            ColumnType::Timestamp,
        ] {
            let v = Value::coerce("", ty, "col", 1).unwrap();
            assert!(v.is_null());
        }
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let v = Value::coerce("  3 ", ColumnType::Integer, "id", 1).unwrap();
        assert_eq!(v, Value::Integer(Some(3)));
    }
}
