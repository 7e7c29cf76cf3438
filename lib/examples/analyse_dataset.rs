//! Analyse a CSV dataset and, if it is accepted, cross-validate a baseline.
//!
//! Run with: cargo run --example analyse_dataset -- path/to/data.csv [config.json]
//!
//! Set `RUST_LOG=tabguard=debug` to see per-column verdicts.

use ndarray::ArrayView2;
use std::collections::BTreeMap;
use std::error::Error;
use tabguard::model_selection::{benchmark_models, Classifier, StratifiedKFold};
use tabguard::{analyse_csv, Analysis, ClassifierConfig};
use tracing_subscriber::EnvFilter;

/// Assigns each test row the label of the closest class mean.
struct NearestCentroid;

impl Classifier for NearestCentroid {
    fn fit_predict(
        &self,
        x_train: ArrayView2<'_, f64>,
        y_train: &[String],
        x_test: ArrayView2<'_, f64>,
    ) -> Result<Vec<String>, Box<dyn Error + Send + Sync>> {
        let n_features = x_train.ncols();
        let mut sums: BTreeMap<&str, (Vec<f64>, usize)> = BTreeMap::new();
        for (row, label) in x_train.rows().into_iter().zip(y_train) {
            let entry = sums
                .entry(label.as_str())
                .or_insert_with(|| (vec![0.0; n_features], 0));
            for (acc, x) in entry.0.iter_mut().zip(row.iter()) {
                // missing cells contribute nothing
                if !x.is_nan() {
                    *acc += x;
                }
            }
            entry.1 += 1;
        }
        let centroids: Vec<(&str, Vec<f64>)> = sums
            .into_iter()
            .map(|(label, (sum, n))| (label, sum.into_iter().map(|s| s / n as f64).collect()))
            .collect();

        x_test
            .rows()
            .into_iter()
            .map(|row| {
                centroids
                    .iter()
                    .map(|(label, c)| {
                        let dist: f64 = row
                            .iter()
                            .zip(c)
                            .filter(|(x, _)| !x.is_nan())
                            .map(|(x, m)| (x - m).powi(2))
                            .sum();
                        (label, dist)
                    })
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|(label, _)| label.to_string())
                    .ok_or_else(|| "no training data".into())
            })
            .collect()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: analyse_dataset <data.csv> [config.json]")?;
    let config = match args.next() {
        Some(config_path) => ClassifierConfig::from_json_file(config_path)?,
        None => ClassifierConfig::default(),
    };

    let analysis = analyse_csv(&path, &config);
    println!("{}", analysis.to_json_pretty()?);

    if let Analysis::Success(report) = &analysis {
        println!("\nDataset accepted. Cross-validating baseline on target '{}'...", report.target);
        let models: Vec<(&str, &dyn Classifier)> = vec![("nearest_centroid", &NearestCentroid)];
        let scores = benchmark_models(&models, report, &StratifiedKFold::default())?;
        println!("{}", serde_json::to_string_pretty(&scores)?);
    }
    Ok(())
}
