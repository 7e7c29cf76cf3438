//! Feature preprocessing for accepted datasets.
//!
//! Turns the features table of an [`AnalysisReport`] into a dense design
//! matrix: numeric columns are standard-scaled, categorical columns are
//! one-hot encoded. Categories not seen during fit encode to all zeros.
//!
//! Follows the unfitted / fitted split: [`FeaturePreprocessor`] holds the
//! configuration, [`FeaturePreprocessor::fit`] learns the statistics and
//! returns a [`FittedFeaturePreprocessor`] that only transforms.
//!
//! # Example
//! ```
//! use tabguard::classify;
//! use tabguard::preprocessing::FeaturePreprocessor;
//! use tabguard::table::{Column, Table};
//!
//! let table = Table::new(vec![
//!     Column::from_ints("age", &[Some(20), Some(40)]),
//!     Column::from_texts("city", &[Some("NYC"), Some("LA")]),
//!     Column::from_ints("label", &[Some(0), Some(1)]),
//! ])
//! .unwrap();
//! let analysis = classify(&table);
//! let report = analysis.report().unwrap();
//!
//! let fitted = FeaturePreprocessor::from_report(report)
//!     .fit(&report.features)
//!     .unwrap();
//! let x = fitted.transform(&report.features).unwrap();
//! assert_eq!(x.shape(), &[2, 3]);
//! ```

use crate::classify::AnalysisReport;
use crate::error::PreprocessingError;
use crate::table::{Column, Table, Value};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Learned scaling statistics for one numeric column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NumericStats {
    pub column: String,
    pub mean: f64,
    /// Population standard deviation; `1.0` for constant columns.
    pub std: f64,
}

/// Learned category levels for one categorical column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryLevels {
    pub column: String,
    /// Sorted levels; `None` (missing) sorts last.
    pub categories: Vec<Option<String>>,
}

/// Unfitted preprocessor.
#[derive(Clone, Debug, Default)]
pub struct FeaturePreprocessor {
    categorical_cols: Vec<String>,
}

impl FeaturePreprocessor {
    /// Columns listed in `categorical_cols` are one-hot encoded; every other
    /// column is scaled.
    pub fn new<I, S>(categorical_cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            categorical_cols: categorical_cols.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_report(report: &AnalysisReport) -> Self {
        Self::new(report.categorical_cols.iter().cloned())
    }

    /// Learns means, standard deviations and category levels from `features`.
    pub fn fit(&self, features: &Table) -> Result<FittedFeaturePreprocessor, PreprocessingError> {
        if features.n_rows() == 0 {
            return Err(PreprocessingError::EmptyData(
                "Cannot fit preprocessor on empty data".to_string(),
            ));
        }
        for name in &self.categorical_cols {
            if features.column(name).is_none() {
                return Err(PreprocessingError::MissingColumn(name.clone()));
            }
        }

        let mut numeric = Vec::new();
        let mut categorical = Vec::new();
        for col in features.columns() {
            if self.categorical_cols.iter().any(|c| c == col.name()) {
                categorical.push(fit_levels(col));
            } else {
                numeric.push(fit_stats(col)?);
            }
        }

        Ok(FittedFeaturePreprocessor {
            numeric,
            categorical,
        })
    }

    pub fn fit_transform(&self, features: &Table) -> Result<Array2<f64>, PreprocessingError> {
        self.fit(features)?.transform(features)
    }
}

fn numeric_values(col: &Column) -> Result<Vec<f64>, PreprocessingError> {
    col.values()
        .iter()
        .enumerate()
        .map(|(row, v)| match v {
            v if v.is_missing() => Ok(f64::NAN),
            v => v.as_f64().ok_or_else(|| PreprocessingError::NonNumeric {
                column: col.name().to_string(),
                row,
            }),
        })
        .collect()
}

fn fit_stats(col: &Column) -> Result<NumericStats, PreprocessingError> {
    let present: Vec<f64> = numeric_values(col)?
        .into_iter()
        .filter(|x| !x.is_nan())
        .collect();
    let n = present.len() as f64;
    let (mean, std) = if present.is_empty() {
        (0.0, 1.0)
    } else {
        let mean = present.iter().sum::<f64>() / n;
        let var = present.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        (mean, var.sqrt())
    };
    Ok(NumericStats {
        column: col.name().to_string(),
        mean,
        std: if std == 0.0 { 1.0 } else { std },
    })
}

fn category_key(value: &Value) -> Option<String> {
    if value.is_missing() {
        None
    } else {
        Some(value.to_string())
    }
}

fn fit_levels(col: &Column) -> CategoryLevels {
    let mut categories: Vec<Option<String>> = col.values().iter().map(category_key).collect();
    // None sorts first under Option's ordering; move it to the end
    categories.sort_by(|a, b| match (a, b) {
        (None, None) => std::cmp::Ordering::Equal,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (Some(_), None) => std::cmp::Ordering::Less,
        (Some(x), Some(y)) => x.cmp(y),
    });
    categories.dedup();
    CategoryLevels {
        column: col.name().to_string(),
        categories,
    }
}

/// Fitted preprocessor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FittedFeaturePreprocessor {
    numeric: Vec<NumericStats>,
    categorical: Vec<CategoryLevels>,
}

impl FittedFeaturePreprocessor {
    pub fn numeric_stats(&self) -> &[NumericStats] {
        &self.numeric
    }

    pub fn category_levels(&self) -> &[CategoryLevels] {
        &self.categorical
    }

    /// Width of the design matrix.
    pub fn n_features_out(&self) -> usize {
        self.numeric.len()
            + self
                .categorical
                .iter()
                .map(|c| c.categories.len())
                .sum::<usize>()
    }

    /// Output column names: numeric columns, then `<column>_<level>` for each
    /// one-hot level (`<column>_nan` for the missing level).
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.numeric.iter().map(|s| s.column.clone()).collect();
        for levels in &self.categorical {
            for cat in &levels.categories {
                names.push(format!(
                    "{}_{}",
                    levels.column,
                    cat.as_deref().unwrap_or("nan")
                ));
            }
        }
        names
    }

    /// Scales and encodes `features`. Missing numeric cells stay `NaN`.
    pub fn transform(&self, features: &Table) -> Result<Array2<f64>, PreprocessingError> {
        let n_rows = features.n_rows();
        let mut out = Array2::<f64>::zeros((n_rows, self.n_features_out()));

        for (j, stats) in self.numeric.iter().enumerate() {
            let col = features
                .column(&stats.column)
                .ok_or_else(|| PreprocessingError::MissingColumn(stats.column.clone()))?;
            for (i, x) in numeric_values(col)?.into_iter().enumerate() {
                out[[i, j]] = (x - stats.mean) / stats.std;
            }
        }

        let mut offset = self.numeric.len();
        for levels in &self.categorical {
            let col = features
                .column(&levels.column)
                .ok_or_else(|| PreprocessingError::MissingColumn(levels.column.clone()))?;
            for (i, value) in col.values().iter().enumerate() {
                let key = category_key(value);
                if let Some(pos) = levels.categories.iter().position(|c| *c == key) {
                    out[[i, offset + pos]] = 1.0;
                }
            }
            offset += levels.categories.len();
        }

        Ok(out)
    }
}
