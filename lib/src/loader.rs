//! CSV loading with dataframe-style storage inference.
//!
//! The first row is the header. Each column's storage is inferred from its
//! non-missing fields:
//!
//! - all integers: `int64`, or `float64` when some fields are missing;
//! - all floats: `float64`;
//! - all `true`/`false` spellings: `bool`, or an `object` column of boolean
//!   cells when some fields are missing;
//! - no present fields at all: `float64` of missing values;
//! - anything else: `object` of text cells.
//!
//! Fields matching [`NA_VALUES`] are missing.
//!
//! # Example
//! ```
//! use tabguard::loader::read_csv;
//! use tabguard::table::StorageKind;
//!
//! let table = read_csv("age,city\n25,NYC\n,LA\n".as_bytes()).unwrap();
//! assert_eq!(table.column("age").unwrap().storage(), &StorageKind::Float64);
//! assert_eq!(table.column("city").unwrap().storage(), &StorageKind::Object);
//! ```

use crate::error::LoadError;
use crate::table::{Column, StorageKind, Table, Value};
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Field spellings read as missing.
pub const NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_VALUES: [&str; 3] = ["True", "TRUE", "true"];
const FALSE_VALUES: [&str; 3] = ["False", "FALSE", "false"];

/// Loads a CSV file from disk.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Table, LoadError> {
    let file = File::open(path.as_ref())?;
    let table = read_csv(BufReader::new(file))?;
    debug!(path = %path.as_ref().display(), shape = ?table.shape(), "loaded csv");
    Ok(table)
}

/// Reads CSV data from any reader.
pub fn read_csv<R: Read>(reader: R) -> Result<Table, LoadError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(LoadError::EmptySource);
    }
    let names = column_names(headers.iter());

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
    for result in rdr.records() {
        let record = result?;
        for (field, cells) in record.iter().zip(raw.iter_mut()) {
            cells.push(parse_field(field));
        }
    }

    let columns = names
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| infer_column(name, cells))
        .collect();
    Ok(Table::new(columns)?)
}

fn parse_field(field: &str) -> Option<String> {
    if NA_VALUES.contains(&field) {
        None
    } else {
        Some(field.to_string())
    }
}

/// Fills blank headers and de-duplicates repeated ones as `name.1`, `name.2`.
fn column_names<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::new();
    for (i, header) in headers.enumerate() {
        let base = if header.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            header.to_string()
        };
        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(name.clone());
        names.push(name);
    }
    names
}

fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if TRUE_VALUES.contains(&s) {
        Some(true)
    } else if FALSE_VALUES.contains(&s) {
        Some(false)
    } else {
        None
    }
}

fn infer_column(name: String, cells: Vec<Option<String>>) -> Column {
    let present: Vec<&str> = cells.iter().flatten().map(String::as_str).collect();
    let has_missing = present.len() < cells.len();

    if present.is_empty() {
        if cells.is_empty() {
            return Column::new(name, StorageKind::Object, Vec::new());
        }
        return Column::new(name, StorageKind::Float64, vec![Value::Missing; cells.len()]);
    }

    if present.iter().all(|s| s.trim().parse::<i64>().is_ok()) {
        if has_missing {
            return map_column(name, StorageKind::Float64, &cells, |s| {
                s.trim().parse::<f64>().ok().map(Value::Float)
            });
        }
        return map_column(name, StorageKind::Int64, &cells, |s| {
            s.trim().parse::<i64>().ok().map(Value::Int)
        });
    }

    if present.iter().all(|s| s.trim().parse::<f64>().is_ok()) {
        return map_column(name, StorageKind::Float64, &cells, |s| {
            s.trim().parse::<f64>().ok().map(Value::Float)
        });
    }

    if present.iter().all(|s| parse_bool(s).is_some()) {
        let storage = if has_missing {
            StorageKind::Object
        } else {
            StorageKind::Boolean
        };
        return map_column(name, storage, &cells, |s| parse_bool(s).map(Value::Bool));
    }

    map_column(name, StorageKind::Object, &cells, |s| Some(Value::text(s)))
}

fn map_column<F>(name: String, storage: StorageKind, cells: &[Option<String>], f: F) -> Column
where
    F: Fn(&str) -> Option<Value>,
{
    let values = cells
        .iter()
        .map(|c| c.as_deref().and_then(&f).unwrap_or(Value::Missing))
        .collect();
    Column::new(name, storage, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load(data: &str) -> Table {
        read_csv(data.as_bytes()).unwrap()
    }

    #[test]
    fn test_infers_numeric_storage() {
        let table = load("a,b,c\n1,1.5,1\n2,2.0,\n3,-1e2,3\n");
        assert_eq!(table.column("a").unwrap().storage(), &StorageKind::Int64);
        assert_eq!(table.column("b").unwrap().storage(), &StorageKind::Float64);
        let c = table.column("c").unwrap();
        assert_eq!(c.storage(), &StorageKind::Float64);
        assert_eq!(c.null_count(), 1);
        assert_eq!(c.values()[2], Value::Float(3.0));
    }

    #[test]
    fn test_infers_text_and_bool_storage() {
        let table = load("name,ok,maybe\nann,True,true\nbob,false,\n");
        let name = table.column("name").unwrap();
        assert_eq!(name.storage(), &StorageKind::Object);
        assert_eq!(name.values()[0], Value::text("ann"));
        assert_eq!(table.column("ok").unwrap().storage(), &StorageKind::Boolean);
        let maybe = table.column("maybe").unwrap();
        assert_eq!(maybe.storage(), &StorageKind::Object);
        assert_eq!(maybe.values()[0], Value::Bool(true));
        assert!(maybe.values()[1].is_missing());
    }

    #[test]
    fn test_na_tokens_are_missing() {
        let table = load("x,y\nNA,a\nn/a,b\nnull,c\n4,<NA>\n");
        let x = table.column("x").unwrap();
        assert_eq!(x.storage(), &StorageKind::Float64);
        assert_eq!(x.null_count(), 3);
        assert_eq!(table.column("y").unwrap().null_count(), 1);
    }

    #[test]
    fn test_na_tokens_match_exactly() {
        let table = load("x\n NA \nb\n");
        let x = table.column("x").unwrap();
        assert_eq!(x.null_count(), 0);
        assert_eq!(x.values()[0], Value::text(" NA "));
    }

    #[test]
    fn test_all_missing_column_is_float() {
        let table = load("x,y\n,1\n,2\n");
        let x = table.column("x").unwrap();
        assert_eq!(x.storage(), &StorageKind::Float64);
        assert_eq!(x.null_count(), 2);
    }

    #[test]
    fn test_header_only_source() {
        let table = load("x,y\n");
        assert_eq!(table.shape(), (0, 2));
    }

    #[test]
    fn test_duplicate_and_blank_headers() {
        let table = load("a,a,,a\n1,2,3,4\n");
        assert_eq!(table.column_names(), vec!["a", "a.1", "Unnamed: 2", "a.2"]);
    }

    #[test]
    fn test_ragged_rows_are_errors() {
        let err = read_csv("a,b\n1,2\n3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Csv(_)));
    }

    #[test]
    fn test_empty_source_is_error() {
        let err = read_csv("".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::EmptySource));
    }

    #[test]
    fn test_load_csv_from_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "age,city")?;
        writeln!(file, "25,NYC")?;
        writeln!(file, "30,LA")?;
        let table = load_csv(file.path())?;
        assert_eq!(table.shape(), (2, 2));
        Ok(())
    }

    #[test]
    fn test_load_csv_missing_file() {
        let err = load_csv("/no/such/file.csv").unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
