//! In-memory tabular data with declared storage kinds.
//!
//! A [`Table`] is an ordered set of named [`Column`]s of equal length. Each
//! column carries the [`StorageKind`] its loader assigned and a sequence of
//! [`Value`] cells, any of which may be missing.
//!
//! Storage kinds follow the dataframe vocabulary (`int64`, `float64`,
//! `object`, ...) so reports read the same as the dtypes a data scientist
//! already knows. Cells inside an `object` column can have different shapes;
//! [`ValueKind`] names those shapes.

use crate::error::TableError;
use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// A single cell.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value.
    Missing,
    Bool(bool),
    Int(i64),
    /// Floating point value. `NaN` counts as missing.
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
    List(Vec<Value>),
    Dict(BTreeMap<String, Value>),
}

impl Value {
    /// Convenience constructor for text cells.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Returns true for `Missing` and for `Float(NaN)`.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Shape of the cell, or `None` when missing.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Missing => None,
            Value::Float(f) if f.is_nan() => None,
            Value::Bool(_) => Some(ValueKind::Bool),
            Value::Int(_) => Some(ValueKind::Int),
            Value::Float(_) => Some(ValueKind::Float),
            Value::Text(_) => Some(ValueKind::Str),
            Value::Timestamp(_) => Some(ValueKind::Datetime),
            Value::List(_) => Some(ValueKind::List),
            Value::Dict(_) => Some(ValueKind::Dict),
        }
    }

    /// Numeric view of natively numeric cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) if !f.is_nan() => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => write!(f, "NaN"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Dict(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "'{k}': {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Shape of a non-missing cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Str,
    Int,
    Float,
    Bool,
    Datetime,
    List,
    Dict,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Str => "str",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::Datetime => "datetime",
            ValueKind::List => "list",
            ValueKind::Dict => "dict",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared storage of a column, assigned by whoever built the table.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// Whole numbers, no missing values.
    Int64,
    /// Whole numbers that may coexist with missing values.
    NullableInt64,
    Float64,
    Boolean,
    /// Explicit categorical / enum tag.
    Category,
    Datetime,
    /// Text or mixed-object storage; the catch-all.
    Object,
    /// Any storage outside the kinds above, e.g. `complex128`.
    Other(String),
}

impl StorageKind {
    pub fn name(&self) -> &str {
        match self {
            StorageKind::Int64 => "int64",
            StorageKind::NullableInt64 => "Int64",
            StorageKind::Float64 => "float64",
            StorageKind::Boolean => "bool",
            StorageKind::Category => "category",
            StorageKind::Datetime => "datetime64[ns]",
            StorageKind::Object => "object",
            StorageKind::Other(name) => name,
        }
    }

    /// Integer or floating point storage, nullable or not.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            StorageKind::Int64 | StorageKind::NullableInt64 | StorageKind::Float64
        )
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for StorageKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A named column of cells.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Column {
    name: String,
    storage: StorageKind,
    values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, storage: StorageKind, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            storage,
            values,
        }
    }

    /// Integer column; any `None` makes the storage `NullableInt64`.
    pub fn from_ints(name: impl Into<String>, values: &[Option<i64>]) -> Self {
        let storage = if values.iter().any(Option::is_none) {
            StorageKind::NullableInt64
        } else {
            StorageKind::Int64
        };
        let values = values
            .iter()
            .map(|v| v.map_or(Value::Missing, Value::Int))
            .collect();
        Self::new(name, storage, values)
    }

    pub fn from_floats(name: impl Into<String>, values: &[Option<f64>]) -> Self {
        let values = values
            .iter()
            .map(|v| v.map_or(Value::Missing, Value::Float))
            .collect();
        Self::new(name, StorageKind::Float64, values)
    }

    /// Object column of text cells.
    pub fn from_texts(name: impl Into<String>, values: &[Option<&str>]) -> Self {
        let values = values
            .iter()
            .map(|v| v.map_or(Value::Missing, Value::text))
            .collect();
        Self::new(name, StorageKind::Object, values)
    }

    pub fn from_bools(name: impl Into<String>, values: &[bool]) -> Self {
        let values = values.iter().copied().map(Value::Bool).collect();
        Self::new(name, StorageKind::Boolean, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage(&self) -> &StorageKind {
        &self.storage
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterator over the non-missing cells.
    pub fn present(&self) -> impl Iterator<Item = &Value> {
        self.values.iter().filter(|v| !v.is_missing())
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    /// New column holding the cells at `indices`, in that order.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    pub fn take(&self, indices: &[usize]) -> Column {
        Column {
            name: self.name.clone(),
            storage: self.storage.clone(),
            values: indices.iter().map(|&i| self.values[i].clone()).collect(),
        }
    }
}

/// Ordered columns sharing one row count.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Builds a table, checking that it has at least one column, that all
    /// columns have the same length and that names are unique.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let first = columns.first().ok_or(TableError::NoColumns)?;
        let expected = first.len();
        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if col.len() != expected {
                return Err(TableError::RaggedColumn {
                    column: col.name.clone(),
                    expected,
                    got: col.len(),
                });
            }
            if !seen.insert(col.name.as_str()) {
                return Err(TableError::DuplicateColumn(col.name.clone()));
            }
        }
        Ok(Self { columns })
    }

    /// Features tables may legitimately have no columns (single-column input).
    pub(crate) fn from_columns_unchecked(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// `(n_rows, n_cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols())
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Row subset of every column. See [`Column::take`].
    pub fn take_rows(&self, indices: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
        }
    }
}
