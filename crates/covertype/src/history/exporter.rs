#![forbid(unsafe_code)]

use crate::history::HistoryRecord;
use crate::tabular;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format `{other}`, expected csv or json")),
        }
    }
}

/// Serialize a subset of records.
///
/// JSON is a pretty-printed array of the records as stored. CSV flattens
/// each record: nested objects become dotted columns (`inputs.elevation`)
/// and arrays are written as JSON text. The header is the union of every
/// record's columns in first-seen order; absent cells are left empty.
pub fn export(records: &[HistoryRecord], format: ExportFormat) -> Result<Vec<u8>, serde_json::Error> {
    match format {
        ExportFormat::Json => serde_json::to_vec_pretty(records),
        ExportFormat::Csv => to_csv(records).map(String::into_bytes),
    }
}

fn to_csv(records: &[HistoryRecord]) -> Result<String, serde_json::Error> {
    let mut columns: Vec<String> = Vec::new();
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut rows: Vec<FxHashMap<String, String>> = Vec::with_capacity(records.len());

    for record in records {
        let mut cells = Vec::new();
        flatten("", &serde_json::to_value(record)?, &mut cells);
        for (key, _) in &cells {
            if seen.insert(key.clone()) {
                columns.push(key.clone());
            }
        }
        rows.push(cells.into_iter().collect());
    }

    let mut out = String::new();
    if columns.is_empty() {
        return Ok(out);
    }
    tabular::write_record(&mut out, &columns);
    for row in &rows {
        let fields = columns
            .iter()
            .map(|column| row.get(column).map(String::as_str).unwrap_or(""));
        tabular::write_record(&mut out, fields);
    }
    Ok(out)
}

fn flatten(prefix: &str, value: &Value, cells: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, inner) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&key, inner, cells);
            }
        }
        Value::Null => cells.push((prefix.to_owned(), String::new())),
        Value::String(s) => cells.push((prefix.to_owned(), s.clone())),
        other => cells.push((prefix.to_owned(), other.to_string())),
    }
}
