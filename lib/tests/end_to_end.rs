use std::io::Write;
use tabguard::table::{Column, StorageKind, Table, Value};
use tabguard::{analyse_csv, classify, Analysis, ClassifierConfig, RejectReason};

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_datetime_column_rejects_whole_table() {
    let table = Table::new(vec![
        Column::from_ints("age", &[Some(25), Some(30), None]),
        Column::from_texts("city", &[Some("NYC"), Some("LA"), Some("NYC")]),
        Column::from_texts(
            "joined",
            &[Some("2020-01-01"), Some("2020-02-15"), Some("2020-03-10")],
        ),
    ])
    .unwrap();

    let analysis = classify(&table);
    assert!(!analysis.is_success());
    let invalid = analysis.invalid_columns();
    assert_eq!(invalid.len(), 1);
    assert_eq!(invalid[0].column, "joined");
    assert_eq!(invalid[0].reason, RejectReason::ParsedDatetime);
}

#[test]
fn test_accepted_table_splits_features_and_target() {
    let table = Table::new(vec![
        Column::from_ints("x", &[Some(1), Some(2), Some(3)]),
        Column::from_texts("y", &[Some("a"), Some("b"), Some("c")]),
    ])
    .unwrap();

    let analysis = classify(&table);
    let report = analysis.report().expect("table should be accepted");
    assert_eq!(report.target, "y");
    assert_eq!(report.features.column_names(), vec!["x"]);
    assert!(report.features.columns()[0].storage().is_numeric());
    assert!(report.categorical_cols.is_empty());
    assert_eq!(report.y.values()[0], Value::text("a"));
}

#[test]
fn test_csv_with_numeric_strings_and_categories() {
    let file = write_csv(
        "height,color,code,label\n\
         1.5,red,007,yes\n\
         2.0,blue,12,no\n\
         ,red,3,yes\n",
    );
    let analysis = analyse_csv(file.path(), &ClassifierConfig::default());
    let report = analysis.report().expect("accepted");

    assert_eq!(report.summary.shape, (3, 4));
    assert_eq!(report.target, "label");
    assert_eq!(report.categorical_cols, vec!["color"]);
    assert_eq!(
        report.features.column("code").unwrap().storage(),
        &StorageKind::Int64
    );
    assert_eq!(report.summary.nulls[0], ("height".to_string(), 1));
}

#[test]
fn test_csv_rejections_are_complete() {
    let file = write_csv(
        "photo,when,size,label\n\
         a.png,2021-01-01,1,0\n\
         b,2021-01-02,2,1\n\
         c,2021-01-03,3,0\n",
    );
    let analysis = analyse_csv(file.path(), &ClassifierConfig::default());
    let names: Vec<&str> = analysis
        .invalid_columns()
        .iter()
        .map(|c| c.column.as_str())
        .collect();
    assert_eq!(names, vec!["photo", "when"]);

    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["status"], "rejected");
    assert_eq!(
        json["invalid_columns"][0]["reason"],
        "image/video filepath (detected by extension)"
    );
}

#[test]
fn test_unreadable_source_is_error_not_rejection() {
    let file = write_csv("a,b\n1,2\n3\n");
    let analysis = analyse_csv(file.path(), &ClassifierConfig::default());
    assert!(matches!(analysis, Analysis::Error { .. }));
    assert!(analysis.invalid_columns().is_empty());

    let json = serde_json::to_value(&analysis).unwrap();
    assert_eq!(json["status"], "error");
}

#[test]
fn test_threshold_override_from_config() {
    let file = write_csv(
        "when,label\n\
         2021-01-01,0\n\
         2021-01-02,1\n\
         soon,0\n\
         later,1\n",
    );
    let default = analyse_csv(file.path(), &ClassifierConfig::default());
    assert!(default.is_success());

    let lenient = ClassifierConfig::new().with_datetime_threshold(0.5);
    let analysis = analyse_csv(file.path(), &lenient);
    assert_eq!(analysis.invalid_columns()[0].column, "when");
}
