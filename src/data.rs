//! Typed raw-dataset values and the cleaning rules applied to them.
//!
//! Columns are typed as a whole, mirroring how a dataframe loader would: a
//! column is numeric only when every present cell parses as a number, and a
//! text-like column keeps numeric-looking cells as text. Cleaning drops
//! missing cells, optionally drops literal `?` markers from text columns,
//! deduplicates, and sorts into a deterministic total order.

use std::{cmp::Ordering, collections::HashMap, fmt, path::Path};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use serde_json::{Number, Value as JsonValue};

use crate::io_utils;

/// Literal marker used by the raw dataset to flag an absent value in text
/// columns, distinct from a truly empty cell.
pub const MISSING_VALUE_MARKER: &str = "?";

#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawValue {
    pub fn is_numeric(&self) -> bool {
        !matches!(self, RawValue::Text(_))
    }

    fn as_f64(&self) -> f64 {
        match self {
            RawValue::Integer(i) => *i as f64,
            RawValue::Float(f) => *f,
            RawValue::Text(_) => f64::NAN,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            RawValue::Integer(i) => JsonValue::from(*i),
            RawValue::Float(f) => match Number::from_f64(*f) {
                Some(number) => JsonValue::Number(number),
                None => JsonValue::String(self.to_string()),
            },
            RawValue::Text(s) => JsonValue::String(s.clone()),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Integer(i) => write!(f, "{i}"),
            RawValue::Float(v) => write!(f, "{v}"),
            RawValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Raw dataset held column-wise; only used to derive unique value sets.
#[derive(Debug, Default)]
pub struct RawTable {
    columns: HashMap<String, Vec<String>>,
}

impl RawTable {
    pub fn read(path: &Path, delimiter: u8, encoding: &'static Encoding) -> Result<Self> {
        let mut reader = io_utils::open_csv_reader_from_path(path, delimiter, true)?;
        let headers = io_utils::reader_headers(&mut reader, encoding)?;
        let mut columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

        for (row_idx, record) in reader.byte_records().enumerate() {
            let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
            let decoded = io_utils::decode_record(&record, encoding)?;
            for (col_idx, cell) in decoded.into_iter().enumerate() {
                if let Some(column) = columns.get_mut(col_idx) {
                    column.push(cell);
                }
            }
        }

        Ok(Self {
            columns: headers.into_iter().zip(columns).collect(),
        })
    }

    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.columns.get(name).map(Vec::as_slice)
    }
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty()
        || cell.eq_ignore_ascii_case("nan")
        || cell.eq_ignore_ascii_case("null")
        || cell.eq_ignore_ascii_case("na")
        || cell.eq_ignore_ascii_case("n/a")
}

fn parse_integer(cell: &str) -> Option<i64> {
    cell.parse().ok()
}

fn parse_float(cell: &str) -> Option<f64> {
    cell.parse().ok().filter(|f: &f64| f.is_finite())
}

/// Cleans one raw column into its unique, deterministically ordered values.
///
/// Missing cells are always dropped. When `drop_missing_markers` is set and
/// the column is text-like, literal `?` cells are dropped too. The result has
/// no duplicates and is sorted ascending, falling back to a string-rendering
/// sort when value types are mixed.
pub fn column_unique_values(cells: &[String], drop_missing_markers: bool) -> Vec<RawValue> {
    let present: Vec<&str> = cells
        .iter()
        .map(String::as_str)
        .filter(|cell| !is_missing(cell))
        .collect();
    if present.is_empty() {
        return Vec::new();
    }

    let all_integer = present
        .iter()
        .copied()
        .all(|cell| parse_integer(cell).is_some());
    let all_numeric = all_integer
        || present
            .iter()
            .copied()
            .all(|cell| parse_float(cell).is_some());

    let values: Vec<RawValue> = if all_integer {
        present
            .iter()
            .copied()
            .filter_map(parse_integer)
            .map(RawValue::Integer)
            .collect()
    } else if all_numeric {
        present
            .iter()
            .copied()
            .filter_map(parse_float)
            .map(RawValue::Float)
            .collect()
    } else {
        // Text-like column: numeric-looking cells stay text so the persisted
        // allowed_values keep a single JSON type per column.
        present
            .iter()
            .copied()
            .filter(|cell| !(drop_missing_markers && *cell == MISSING_VALUE_MARKER))
            .map(|cell| RawValue::Text(cell.to_string()))
            .collect()
    };

    normalize_unique(values)
}

/// Deduplicates and sorts values into a deterministic total order.
pub fn normalize_unique(mut values: Vec<RawValue>) -> Vec<RawValue> {
    let order = value_order(&values);
    values.sort_by(|a, b| order(a, b));
    values.dedup_by(|a, b| order(a, b) == Ordering::Equal);
    values
}

fn value_order(values: &[RawValue]) -> fn(&RawValue, &RawValue) -> Ordering {
    let all_numeric = values.iter().all(RawValue::is_numeric);
    let all_text = values.iter().all(|v| matches!(v, RawValue::Text(_)));
    if all_numeric {
        numeric_order
    } else if all_text {
        text_order
    } else {
        display_order
    }
}

fn numeric_order(a: &RawValue, b: &RawValue) -> Ordering {
    a.as_f64().total_cmp(&b.as_f64())
}

fn text_order(a: &RawValue, b: &RawValue) -> Ordering {
    match (a, b) {
        (RawValue::Text(a), RawValue::Text(b)) => a.cmp(b),
        _ => display_order(a, b),
    }
}

// Mixed-type fallback: compare string renderings for a stable total order.
fn display_order(a: &RawValue, b: &RawValue) -> Ordering {
    a.to_string().cmp(&b.to_string())
}
