//! Cross-validated benchmarking of classifiers on an accepted dataset.
//!
//! Models are plugged in through the [`Classifier`] trait. For every fold of a
//! [`StratifiedKFold`] split the [`FeaturePreprocessor`] is fitted on the
//! training rows only, both folds are transformed, and accuracy is scored on
//! the held-out rows. [`benchmark_models`] summarizes each model as mean and
//! standard deviation of its fold accuracies.

use crate::classify::AnalysisReport;
use crate::error::SelectionError;
use crate::preprocessing::FeaturePreprocessor;
use crate::table::Column;
use ndarray::ArrayView2;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Default number of folds.
pub const DEFAULT_N_SPLITS: usize = 5;

/// A classification model evaluated by the harness.
pub trait Classifier {
    /// Fits on `(x_train, y_train)` and predicts a label for every row of
    /// `x_test`.
    fn fit_predict(
        &self,
        x_train: ArrayView2<'_, f64>,
        y_train: &[String],
        x_test: ArrayView2<'_, f64>,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Train and test row indices of one fold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Unshuffled stratified k-fold splitter.
///
/// Classes are numbered in order of first appearance. Samples of each class
/// are dealt to test folds so that every fold receives a near-equal share of
/// every class, and within a class earlier samples land in earlier folds.
#[derive(Clone, Copy, Debug)]
pub struct StratifiedKFold {
    n_splits: usize,
}

impl Default for StratifiedKFold {
    fn default() -> Self {
        Self::new(DEFAULT_N_SPLITS)
    }
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Splits sample indices `0..labels.len()` into folds.
    pub fn split(&self, labels: &[String]) -> Result<Vec<Fold>, SelectionError> {
        let k = self.n_splits;
        if k < 2 {
            return Err(SelectionError::InvalidParameter(format!(
                "n_splits must be at least 2, got {k}"
            )));
        }

        let mut classes: Vec<&str> = Vec::new();
        let encoded: Vec<usize> = labels
            .iter()
            .map(|label| match classes.iter().position(|c| *c == label) {
                Some(idx) => idx,
                None => {
                    classes.push(label);
                    classes.len() - 1
                }
            })
            .collect();

        let mut counts = vec![0usize; classes.len()];
        for &c in &encoded {
            counts[c] += 1;
        }
        let max_count = counts.iter().copied().max().unwrap_or(0);
        if k > max_count {
            return Err(SelectionError::InvalidParameter(format!(
                "n_splits={k} cannot be greater than the number of members in each class"
            )));
        }
        if let Some(&min_count) = counts.iter().min() {
            if min_count < k {
                warn!(
                    min_count,
                    n_splits = k,
                    "least populated class has fewer members than n_splits"
                );
            }
        }

        // Deal the class-sorted sample sequence round-robin over folds.
        let mut sorted = encoded.clone();
        sorted.sort_unstable();
        let mut allocation = vec![vec![0usize; classes.len()]; k];
        for (pos, &c) in sorted.iter().enumerate() {
            allocation[pos % k][c] += 1;
        }

        let mut test_fold = vec![0usize; labels.len()];
        for class in 0..classes.len() {
            let fold_seq = (0..k).flat_map(|f| std::iter::repeat(f).take(allocation[f][class]));
            let members = encoded
                .iter()
                .enumerate()
                .filter(|&(_, &c)| c == class)
                .map(|(i, _)| i);
            for (sample, fold) in members.zip(fold_seq) {
                test_fold[sample] = fold;
            }
        }

        Ok((0..k)
            .map(|f| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..labels.len()).partition(|&i| test_fold[i] == f);
                Fold { train, test }
            })
            .collect())
    }
}

/// Mean and population standard deviation of fold accuracies.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ModelScore {
    pub mean_accuracy: f64,
    pub std_accuracy: f64,
}

impl ModelScore {
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self {
                mean_accuracy: f64::NAN,
                std_accuracy: f64::NAN,
            };
        }
        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let var = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Self {
            mean_accuracy: mean,
            std_accuracy: var.sqrt(),
        }
    }
}

/// Target labels as strings; missing labels are an error.
pub fn target_labels(y: &Column) -> Result<Vec<String>, SelectionError> {
    y.values()
        .iter()
        .map(|v| {
            if v.is_missing() {
                Err(SelectionError::MissingTarget(y.name().to_string()))
            } else {
                Ok(v.to_string())
            }
        })
        .collect()
}

fn accuracy(truth: &[String], predicted: &[String]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let hits = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    hits as f64 / truth.len() as f64
}

/// Per-fold accuracies of `model` on `report`.
pub fn cross_val_accuracy(
    name: &str,
    model: &dyn Classifier,
    report: &AnalysisReport,
    cv: &StratifiedKFold,
) -> Result<Vec<f64>, SelectionError> {
    let labels = target_labels(&report.y)?;
    let preprocessor = FeaturePreprocessor::from_report(report);

    let mut scores = Vec::with_capacity(cv.n_splits());
    for (i, fold) in cv.split(&labels)?.into_iter().enumerate() {
        let train = report.features.take_rows(&fold.train);
        let test = report.features.take_rows(&fold.test);
        let fitted = preprocessor.fit(&train)?;
        let x_train = fitted.transform(&train)?;
        let x_test = fitted.transform(&test)?;

        let y_train: Vec<String> = fold.train.iter().map(|&j| labels[j].clone()).collect();
        let y_test: Vec<String> = fold.test.iter().map(|&j| labels[j].clone()).collect();

        let predicted = model
            .fit_predict(x_train.view(), &y_train, x_test.view())
            .map_err(|e| SelectionError::Model {
                model: name.to_string(),
                message: e.to_string(),
            })?;
        if predicted.len() != y_test.len() {
            return Err(SelectionError::PredictionCount {
                model: name.to_string(),
                expected: y_test.len(),
                got: predicted.len(),
            });
        }

        let score = accuracy(&y_test, &predicted);
        debug!(model = name, fold = i, accuracy = score, "scored fold");
        scores.push(score);
    }
    Ok(scores)
}

/// Cross-validates every model and summarizes its accuracy.
pub fn benchmark_models(
    models: &[(&str, &dyn Classifier)],
    report: &AnalysisReport,
    cv: &StratifiedKFold,
) -> Result<BTreeMap<String, ModelScore>, SelectionError> {
    let mut results = BTreeMap::new();
    for (name, model) in models {
        let scores = cross_val_accuracy(name, *model, report, cv)?;
        let score = ModelScore::from_scores(&scores);
        info!(
            model = *name,
            mean_accuracy = score.mean_accuracy,
            std_accuracy = score.std_accuracy,
            "model evaluated"
        );
        results.insert(name.to_string(), score);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::table::Table;

    fn labels(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    /// Predicts the most frequent training label.
    struct Majority;

    impl Classifier for Majority {
        fn fit_predict(
            &self,
            _x_train: ArrayView2<'_, f64>,
            y_train: &[String],
            x_test: ArrayView2<'_, f64>,
        ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for y in y_train {
                *counts.entry(y.as_str()).or_default() += 1;
            }
            let best = counts
                .into_iter()
                .max_by_key(|(_, n)| *n)
                .map(|(label, _)| label.to_string())
                .ok_or("no training labels")?;
            Ok(vec![best; x_test.nrows()])
        }
    }

    /// Predicts by the sign of the first feature.
    struct FirstFeatureSign;

    impl Classifier for FirstFeatureSign {
        fn fit_predict(
            &self,
            _x_train: ArrayView2<'_, f64>,
            _y_train: &[String],
            x_test: ArrayView2<'_, f64>,
        ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(x_test
                .rows()
                .into_iter()
                .map(|row| if row[0] > 0.0 { "1" } else { "0" }.to_string())
                .collect())
        }
    }

    fn separable_report() -> AnalysisReport {
        // class 0 at 0..5, class 1 at 10..15
        let x: Vec<Option<i64>> = (0..10).map(|i| Some(if i < 5 { i } else { i + 5 })).collect();
        let y: Vec<Option<i64>> = (0..10).map(|i| Some(i64::from(i >= 5))).collect();
        let table = Table::new(vec![
            crate::table::Column::from_ints("x", &x),
            crate::table::Column::from_ints("label", &y),
        ])
        .unwrap();
        classify(&table).report().cloned().unwrap()
    }

    #[test]
    fn test_stratified_folds_partition_samples() {
        let y = labels(&["a", "a", "a", "b", "b", "b", "a", "b", "a", "b"]);
        let folds = StratifiedKFold::new(5).split(&y).unwrap();
        assert_eq!(folds.len(), 5);

        let mut seen: Vec<usize> = folds.iter().flat_map(|f| f.test.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());

        for fold in &folds {
            assert_eq!(fold.test.len(), 2);
            assert_eq!(fold.train.len() + fold.test.len(), 10);
            let classes: Vec<&str> = fold.test.iter().map(|&i| y[i].as_str()).collect();
            assert!(classes.contains(&"a") && classes.contains(&"b"));
        }
    }

    #[test]
    fn test_stratified_folds_keep_class_order() {
        let y = labels(&["a", "b", "a", "b", "a", "b"]);
        let folds = StratifiedKFold::new(3).split(&y).unwrap();
        assert_eq!(folds[0].test, vec![0, 1]);
        assert_eq!(folds[1].test, vec![2, 3]);
        assert_eq!(folds[2].test, vec![4, 5]);
    }

    #[test]
    fn test_stratified_split_errors() {
        let y = labels(&["a", "b", "a"]);
        assert!(matches!(
            StratifiedKFold::new(1).split(&y),
            Err(SelectionError::InvalidParameter(_))
        ));
        assert!(matches!(
            StratifiedKFold::new(5).split(&y),
            Err(SelectionError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_model_score_population_std() {
        let score = ModelScore::from_scores(&[1.0, 0.5, 1.0, 0.5]);
        assert!((score.mean_accuracy - 0.75).abs() < 1e-12);
        assert!((score.std_accuracy - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_target_labels_reject_missing() {
        let y = crate::table::Column::from_ints("label", &[Some(1), None]);
        assert_eq!(
            target_labels(&y).unwrap_err(),
            SelectionError::MissingTarget("label".to_string())
        );
    }

    #[test]
    fn test_benchmark_models() {
        let report = separable_report();
        let models: Vec<(&str, &dyn Classifier)> =
            vec![("majority", &Majority), ("sign", &FirstFeatureSign)];
        let results = benchmark_models(&models, &report, &StratifiedKFold::default()).unwrap();

        assert_eq!(results.len(), 2);
        let sign = results["sign"];
        assert!((sign.mean_accuracy - 1.0).abs() < 1e-12);
        assert_eq!(sign.std_accuracy, 0.0);
        let majority = results["majority"];
        assert!((majority.mean_accuracy - 0.5).abs() < 1e-12);
    }

    struct WrongLength;

    impl Classifier for WrongLength {
        fn fit_predict(
            &self,
            _x_train: ArrayView2<'_, f64>,
            _y_train: &[String],
            _x_test: ArrayView2<'_, f64>,
        ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_prediction_count_checked() {
        let report = separable_report();
        let err = cross_val_accuracy("bad", &WrongLength, &report, &StratifiedKFold::default())
            .unwrap_err();
        assert!(matches!(err, SelectionError::PredictionCount { .. }));
    }
}
