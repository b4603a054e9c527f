//! Value coercion against declared column types.
//!
//! Payload values are rewritten only where the destination would reject the
//! upstream representation. Today that is TIME columns, which receive
//! RFC 3339 timestamps from most sources but accept only a clock time.

use crate::columns::{ColumnKind, ColumnTypes};
use chrono::{DateTime, NaiveTime};
use sink_core::{StructuredData, Value};

/// chrono layout of a TIME value (`HH:MM:SS`).
pub const TIME_LAYOUT: &str = "%H:%M:%S";

/// TIME with optional fractional seconds (`HH:MM:SS.ffffff`).
const TIME_LAYOUT_FRACTIONAL: &str = "%H:%M:%S%.f";

/// Error type for value coercion.
#[derive(Debug, thiserror::Error)]
pub enum CoercionError {
    /// Value cannot be turned into a TIME value
    #[error("parse time: convert value {value} of column '{column}' to time")]
    InvalidTime { column: String, value: String },
}

/// Rewrite `data` according to the declared column types.
///
/// Null values and columns without a declared type pass through unchanged.
pub fn coerce_columns(
    column_types: &ColumnTypes,
    data: StructuredData,
) -> Result<StructuredData, CoercionError> {
    data.into_iter()
        .map(|(column, value)| {
            if value.is_null() {
                return Ok((column, value));
            }

            match column_types.kind(&column) {
                ColumnKind::Time => {
                    let value = coerce_time(&column, value)?;
                    Ok((column, value))
                }
                ColumnKind::Other => Ok((column, value)),
            }
        })
        .collect()
}

fn coerce_time(column: &str, value: Value) -> Result<Value, CoercionError> {
    let invalid = |value: &Value| CoercionError::InvalidTime {
        column: column.to_string(),
        value: value.to_string(),
    };

    match &value {
        Value::String(s) => {
            if [TIME_LAYOUT, TIME_LAYOUT_FRACTIONAL]
                .iter()
                .any(|layout| NaiveTime::parse_from_str(s, layout).is_ok())
            {
                return Ok(value);
            }

            // Keep the wall clock time in the timestamp's own offset
            let parsed = DateTime::parse_from_rfc3339(s).map_err(|_| invalid(&value))?;
            Ok(Value::String(parsed.format(TIME_LAYOUT).to_string()))
        }
        Value::Timestamp(ts) => Ok(Value::String(ts.format(TIME_LAYOUT).to_string())),
        Value::Null
        | Value::Bool(_)
        | Value::Int(_)
        | Value::Float(_)
        | Value::Json(_) => Err(invalid(&value)),
    }
}
