//! # tabguard
//!
//! Column-type policy checks for tabular classification datasets.
//!
//! Given an untyped table (typically loaded from CSV), every column is
//! classified as numeric, categorical or rejected. Datasets whose columns all
//! pass are split into a features table and a target column ready for a
//! standard preprocessing + cross-validation benchmark.
//!
//! ## Core Design Principles
//!
//! - **Closed types**: storage kinds, cell shapes and rejection reasons are
//!   enums; nothing is discovered through runtime type inspection.
//! - **All-or-nothing**: a table is either accepted as a whole or rejected
//!   with the reason for every offending column. Columns are never dropped.
//! - **Pure classification**: [`classify`] is a deterministic function of the
//!   table snapshot and the [`ClassifierConfig`].
//!
//! ## Quick Start
//!
//! ```rust
//! use tabguard::{classify, Analysis};
//! use tabguard::table::{Column, Table};
//!
//! let table = Table::new(vec![
//!     Column::from_ints("x", &[Some(1), Some(2), Some(3)]),
//!     Column::from_texts("y", &[Some("a"), Some("b"), Some("c")]),
//! ])
//! .unwrap();
//!
//! match classify(&table) {
//!     Analysis::Success(report) => {
//!         assert_eq!(report.target, "y");
//!         assert!(report.categorical_cols.is_empty());
//!     }
//!     other => panic!("unexpected verdict: {other:?}"),
//! }
//! ```
//!
//! ## Module Structure
//!
//! - `table` — Cells, columns and tables with declared storage kinds
//! - `loader` — CSV loading with storage inference
//! - `config` — Policy constants and `ClassifierConfig`
//! - `classify` — Per-column rules and the table-level analysis
//! - `preprocessing` — Standard scaling and one-hot encoding of features
//! - `model_selection` — Stratified k-fold benchmarking of pluggable classifiers
//! - `error` — Error types

/// Cells, columns and tables.
pub mod table;

/// CSV loading.
pub mod loader;

/// Classifier policy configuration.
pub mod config;

/// Column classification and dataset analysis.
pub mod classify;

/// Feature scaling and encoding for downstream models.
pub mod preprocessing;

/// Cross-validation and model benchmarking.
pub mod model_selection;

pub mod error;

pub use classify::{
    analyse_csv, classify, classify_column, classify_with, Analysis, AnalysisReport,
    ColumnVerdict, RejectReason,
};
pub use config::{ClassifierConfig, DATETIME_PARSE_THRESHOLD, MEDIA_EXTENSIONS};
pub use error::{LoadError, PreprocessingError, SelectionError, TableError};
