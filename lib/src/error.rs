//! Error types for table construction, loading, preprocessing and model selection.

use thiserror::Error;

/// A `Table` could not be assembled from the given columns.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    /// A table needs at least one column.
    #[error("table has no columns")]
    NoColumns,
    /// Column lengths disagree with the first column.
    #[error("column '{column}' has {got} values, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        got: usize,
    },
    /// Two columns share a name.
    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
}

/// The source could not be materialized into a `Table`.
#[derive(Debug, Error)]
pub enum LoadError {
    /// I/O error while opening or reading the source.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed CSV (bad quoting, invalid UTF-8, inconsistent field counts).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// The source has no header row.
    #[error("no columns to parse from source")]
    EmptySource,
    /// The parsed columns do not form a valid table.
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Error type for feature preprocessing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PreprocessingError {
    /// Empty data provided where non-empty was required.
    #[error("Empty data: {0}")]
    EmptyData(String),
    /// A column named at fit time is absent from the input.
    #[error("Missing column: {0}")]
    MissingColumn(String),
    /// A numeric column holds a value that is not a number.
    #[error("Non-numeric value in column '{column}' at row {row}")]
    NonNumeric { column: String, row: usize },
}

/// Error type for cross-validation and model benchmarking.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectionError {
    /// Invalid number of folds for the sample count.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    /// The target contains missing labels.
    #[error("Target column '{0}' contains missing values")]
    MissingTarget(String),
    /// A classifier failed to fit or predict.
    #[error("Model '{model}' failed: {message}")]
    Model { model: String, message: String },
    /// A classifier returned the wrong number of predictions.
    #[error("Model '{model}' returned {got} predictions for {expected} samples")]
    PredictionCount {
        model: String,
        expected: usize,
        got: usize,
    },
    /// Fold preprocessing failed.
    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),
}
