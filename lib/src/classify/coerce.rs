//! Strict numeric coercion of object cells.

use crate::table::{Column, StorageKind, Value};

/// Coerces a cell to a number.
///
/// Text is trimmed and parsed with `.` as the decimal point (`"3"`, `"-2.5"`,
/// `" 1e3 "`, `"inf"`). Text that spells `nan` does not coerce, since it would
/// only produce another missing value. Booleans, timestamps and structured
/// cells never coerce.
pub fn coerce_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) if !f.is_nan() => Some(*f),
        Value::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|f| !f.is_nan())
        }
        _ => None,
    }
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::Text(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// True when every non-missing cell coerces. Vacuously true for a column with
/// no present cells.
pub fn all_coerce(column: &Column) -> bool {
    column.present().all(|v| coerce_numeric(v).is_some())
}

/// Numeric replacement for an object column.
///
/// Produces `int64` storage when every cell is present and integral, and
/// `float64` otherwise. Cells that fail to coerce become missing.
pub fn coerce_column(column: &Column) -> Column {
    let integral: Option<Vec<i64>> = column.values().iter().map(coerce_integer).collect();
    if let Some(ints) = integral {
        if !ints.is_empty() {
            let values = ints.into_iter().map(Value::Int).collect();
            return Column::new(column.name(), StorageKind::Int64, values);
        }
    }

    let values = column
        .values()
        .iter()
        .map(|v| coerce_numeric(v).map_or(Value::Missing, Value::Float))
        .collect();
    Column::new(column.name(), StorageKind::Float64, values)
}
