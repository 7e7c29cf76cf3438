//! Synthetic tables for benchmarking tabguard.
//!
//! Generators are deterministic so runs are comparable across machines.

use tabguard::table::{Column, StorageKind, Table, Value};
use tabguard::TableError;

/// Shape of a generated column.
#[derive(Debug, Clone, Copy)]
pub enum ColumnShape {
    /// Native integers.
    Integers,
    /// Numbers stored as text, every tenth missing.
    NumericText,
    /// Low-cardinality labels.
    Labels,
    /// ISO dates stored as text.
    DateText,
    /// Labels with one media path at the end.
    MediaPaths,
}

/// One column of `n_rows` cells.
pub fn column(name: &str, shape: ColumnShape, n_rows: usize) -> Column {
    const LABELS: [&str; 4] = ["red", "green", "blue", "amber"];
    let values: Vec<Value> = (0..n_rows)
        .map(|i| match shape {
            ColumnShape::Integers => Value::Int(i as i64),
            ColumnShape::NumericText if i % 10 == 9 => Value::Missing,
            ColumnShape::NumericText => Value::text(format!("{}.5", i % 1000)),
            ColumnShape::Labels => Value::text(LABELS[i % LABELS.len()]),
            ColumnShape::DateText => Value::text(format!(
                "20{:02}-{:02}-{:02}",
                i % 30,
                i % 12 + 1,
                i % 28 + 1
            )),
            ColumnShape::MediaPaths if i + 1 == n_rows => Value::text("frames/last.png"),
            ColumnShape::MediaPaths => Value::text(LABELS[i % LABELS.len()]),
        })
        .collect();
    let storage = match shape {
        ColumnShape::Integers => StorageKind::Int64,
        _ => StorageKind::Object,
    };
    Column::new(name, storage, values)
}

/// A table with one column per shape, ending in an integer target.
pub fn mixed_table(n_rows: usize, shapes: &[ColumnShape]) -> Result<Table, TableError> {
    let mut columns: Vec<Column> = shapes
        .iter()
        .enumerate()
        .map(|(i, &shape)| column(&format!("c{i}"), shape, n_rows))
        .collect();
    columns.push(column("target", ColumnShape::Integers, n_rows));
    Table::new(columns)
}
