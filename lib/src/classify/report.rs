//! Table-level aggregation and the analysis report.
//!
//! [`classify`] evaluates every column, collects every rejection in column
//! order and only builds the features/target split when nothing was
//! rejected. [`analyse_csv`] adds the load step in front and reports a source
//! that cannot be read as [`Analysis::Error`].

use super::{classify_column, coerce, ColumnVerdict, RejectReason};
use crate::config::ClassifierConfig;
use crate::loader;
use crate::table::{Column, StorageKind, Table};
use serde::{Serialize, Serializer};
use std::path::Path;
use tracing::{debug, info, warn};

const REJECTED_MESSAGE: &str = "Dataset rejected. Only numeric or categorical \
    (string/object/bool/category) columns are supported. Supported datatypes are int, \
    float, object (string), bool, and category.";

const REJECTED_NOTE: &str = "Numeric-looking strings (e.g. '3.4') are accepted (they will be \
    interpreted as numeric). Datetime-like columns, image/video filepath columns, and \
    mixed-type object columns are rejected.";

/// Shape, null counts and storage names of a table, in column order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableSummary {
    /// `(n_rows, n_cols)`.
    pub shape: (usize, usize),
    /// Missing cells per column; serialized as a `{column: count}` map.
    #[serde(serialize_with = "ordered_map")]
    pub nulls: Vec<(String, usize)>,
    /// Storage name per column; serialized as a `{column: dtype}` map.
    #[serde(serialize_with = "ordered_map")]
    pub dtypes: Vec<(String, String)>,
}

/// Serializes `(key, value)` pairs as a map, keeping column order.
#[allow(clippy::ptr_arg)]
fn ordered_map<S, V>(pairs: &Vec<(String, V)>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    serializer.collect_map(pairs.iter().map(|(k, v)| (k, v)))
}

impl TableSummary {
    pub fn of(table: &Table) -> Self {
        Self {
            shape: table.shape(),
            nulls: table
                .columns()
                .iter()
                .map(|c| (c.name().to_string(), c.null_count()))
                .collect(),
            dtypes: table
                .columns()
                .iter()
                .map(|c| (c.name().to_string(), c.storage().name().to_string()))
                .collect(),
        }
    }
}

/// A column that failed the content policy.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InvalidColumn {
    pub column: String,
    pub reason: RejectReason,
}

/// The table was read but at least one column fails the policy.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Rejection {
    pub message: String,
    /// Every offending column, in table order.
    pub invalid_columns: Vec<InvalidColumn>,
    pub note: String,
    pub summary: TableSummary,
}

/// Features/target split of an accepted table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub summary: TableSummary,
    /// Name of the last column.
    pub target: String,
    /// All columns except the target; numeric-string columns coerced.
    #[serde(rename = "X")]
    pub features: Table,
    pub y: Column,
    /// Feature columns to one-hot encode downstream.
    pub categorical_cols: Vec<String>,
    /// Verdict of every column, target included.
    pub verdicts: Vec<(String, ColumnVerdict)>,
}

/// Table-level verdict.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Analysis {
    /// The source could not be materialized.
    Error { message: String },
    Rejected(Rejection),
    Success(AnalysisReport),
}

impl Analysis {
    pub fn is_success(&self) -> bool {
        matches!(self, Analysis::Success(_))
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            Analysis::Success(report) => Some(report),
            _ => None,
        }
    }

    /// Rejected columns; empty unless the verdict is `Rejected`.
    pub fn invalid_columns(&self) -> &[InvalidColumn] {
        match self {
            Analysis::Rejected(rejection) => &rejection.invalid_columns,
            _ => &[],
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Classifies `table` with the default policy.
pub fn classify(table: &Table) -> Analysis {
    classify_with(table, &ClassifierConfig::default())
}

/// Classifies every column of `table` and, if all pass, splits it into
/// features and target.
pub fn classify_with(table: &Table, config: &ClassifierConfig) -> Analysis {
    let verdicts: Vec<(String, ColumnVerdict)> = table
        .columns()
        .iter()
        .map(|col| {
            let verdict = classify_column(col, config);
            debug!(column = col.name(), dtype = %col.storage(), ?verdict, "classified column");
            (col.name().to_string(), verdict)
        })
        .collect();

    let summary = TableSummary::of(table);

    let invalid_columns: Vec<InvalidColumn> = verdicts
        .iter()
        .filter_map(|(name, verdict)| {
            verdict.reason().map(|reason| InvalidColumn {
                column: name.clone(),
                reason: reason.clone(),
            })
        })
        .collect();

    if !invalid_columns.is_empty() {
        info!(
            rejected = invalid_columns.len(),
            columns = table.n_cols(),
            "dataset rejected"
        );
        return Analysis::Rejected(Rejection {
            message: REJECTED_MESSAGE.to_string(),
            invalid_columns,
            note: REJECTED_NOTE.to_string(),
            summary,
        });
    }

    let Some((target_col, feature_cols)) = table.columns().split_last() else {
        return Analysis::Error {
            message: "Error reading dataset: table has no columns".to_string(),
        };
    };
    let y = target_col.clone();

    let mut categorical_cols = Vec::new();
    let features: Vec<Column> = feature_cols
        .iter()
        .zip(&verdicts)
        .map(|(col, (_, verdict))| match verdict {
            ColumnVerdict::Numeric if col.storage() == &StorageKind::Object => {
                coerce::coerce_column(col)
            }
            ColumnVerdict::Categorical => {
                categorical_cols.push(col.name().to_string());
                col.clone()
            }
            _ => col.clone(),
        })
        .collect();

    info!(
        shape = ?summary.shape,
        target = y.name(),
        categorical = categorical_cols.len(),
        "dataset accepted"
    );

    Analysis::Success(AnalysisReport {
        summary,
        target: y.name().to_string(),
        features: Table::from_columns_unchecked(features),
        y,
        categorical_cols,
        verdicts,
    })
}

/// Loads a CSV file and classifies it.
pub fn analyse_csv<P: AsRef<Path>>(path: P, config: &ClassifierConfig) -> Analysis {
    match loader::load_csv(path.as_ref()) {
        Ok(table) => classify_with(&table, config),
        Err(e) => {
            warn!(path = %path.as_ref().display(), error = %e, "failed to read dataset");
            Analysis::Error {
                message: format!("Error reading dataset: {e}"),
            }
        }
    }
}
