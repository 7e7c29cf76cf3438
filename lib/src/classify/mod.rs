//! Column-type classification.
//!
//! Every column of a [`Table`](crate::table::Table) is classified as numeric,
//! categorical or rejected. The rules run top to bottom and the first match
//! wins:
//!
//! 1. numeric storage (`int64`, nullable `Int64`, `float64`) is numeric;
//! 2. native datetime storage is rejected;
//! 3. `object` storage is inspected cell by cell, ignoring missing cells:
//!    - every cell coerces to a number: numeric;
//!    - at least [`DATETIME_PARSE_THRESHOLD`](crate::config::DATETIME_PARSE_THRESHOLD)
//!      of the cells parse as dates: rejected;
//!    - any cell ends with a media extension: rejected;
//!    - more than one cell shape: rejected;
//!    - otherwise categorical;
//! 4. boolean and `category` storage is categorical;
//! 5. anything else is rejected as unsupported.
//!
//! Table-level aggregation lives in [`report`].

pub mod coerce;
pub mod datetime;
pub mod report;

pub use report::{
    analyse_csv, classify, classify_with, Analysis, AnalysisReport, InvalidColumn, Rejection,
    TableSummary,
};

use crate::config::ClassifierConfig;
use crate::table::{Column, StorageKind, ValueKind};
use serde::{Serialize, Serializer};
use std::fmt;

/// Why a column fails the content policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// Native datetime storage.
    NativeDatetime,
    /// Text cells that mostly parse as dates.
    ParsedDatetime,
    /// Text cells that look like image or video paths.
    MediaFilepath,
    /// Distinct cell shapes, in discovery order.
    MixedKinds(Vec<ValueKind>),
    /// Storage outside the supported kinds, by name.
    UnsupportedStorage(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NativeDatetime => f.write_str("datetime-like (native datetime type)"),
            RejectReason::ParsedDatetime => {
                f.write_str("datetime-like (string values parsed to datetime)")
            }
            RejectReason::MediaFilepath => {
                f.write_str("image/video filepath (detected by extension)")
            }
            RejectReason::MixedKinds(kinds) => {
                let names: Vec<String> = kinds.iter().map(|k| format!("'{}'", k.name())).collect();
                write!(
                    f,
                    "mixed python types in object column: ({})",
                    names.join(", ")
                )
            }
            RejectReason::UnsupportedStorage(name) => write!(f, "unsupported dtype: {name}"),
        }
    }
}

impl Serialize for RejectReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome for a single column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "lowercase")]
pub enum ColumnVerdict {
    Numeric,
    Categorical,
    Rejected(RejectReason),
}

impl ColumnVerdict {
    pub fn is_rejected(&self) -> bool {
        matches!(self, ColumnVerdict::Rejected(_))
    }

    pub fn reason(&self) -> Option<&RejectReason> {
        match self {
            ColumnVerdict::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Classifies one column under `config`.
pub fn classify_column(column: &Column, config: &ClassifierConfig) -> ColumnVerdict {
    match column.storage() {
        s if s.is_numeric() => ColumnVerdict::Numeric,
        StorageKind::Datetime => ColumnVerdict::Rejected(RejectReason::NativeDatetime),
        StorageKind::Object => classify_object(column, config),
        StorageKind::Boolean | StorageKind::Category => ColumnVerdict::Categorical,
        other => ColumnVerdict::Rejected(RejectReason::UnsupportedStorage(other.name().to_string())),
    }
}

fn classify_object(column: &Column, config: &ClassifierConfig) -> ColumnVerdict {
    if coerce::all_coerce(column) {
        return ColumnVerdict::Numeric;
    }

    let present: Vec<_> = column.present().collect();

    let parsed = present
        .iter()
        .filter(|v| datetime::is_datetime_like(v))
        .count();
    // present is non-empty here: an empty column coerces vacuously above
    if parsed as f64 / present.len() as f64 >= config.datetime_threshold {
        return ColumnVerdict::Rejected(RejectReason::ParsedDatetime);
    }

    if present
        .iter()
        .any(|v| config.is_media_path(&v.to_string().to_lowercase()))
    {
        return ColumnVerdict::Rejected(RejectReason::MediaFilepath);
    }

    let mut kinds: Vec<ValueKind> = Vec::new();
    for kind in present.iter().filter_map(|v| v.kind()) {
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    if kinds.len() > 1 {
        return ColumnVerdict::Rejected(RejectReason::MixedKinds(kinds));
    }

    ColumnVerdict::Categorical
}
