//! Reading snapshot files.
//!
//! Exports arrive either as JSON (a bare array, or an object wrapping the
//! array under a well-known key) or as pipe-delimited text tables:
//!
//! ```text
//! Id | DivisionID | Status     | OrderID
//! ---+------------+------------+--------
//! 40 | 2 - IL     | Onboarding | 3
//! ```

use crate::error::{OpcertError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Keys under which exports wrap their record arrays.
pub const WRAPPER_KEYS: &[&str] = &[
    "operators",
    "certifications",
    "statusTracker",
    "statusTypes",
    "pizzaStatuses",
    "records",
    "data",
];

/// A parsed pipe table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipeTable {
    pub records: Vec<Value>,
    /// Rows dropped because their cell count did not match the header.
    pub skipped_rows: usize,
}

/// Read all records from a snapshot file.
///
/// # Errors
///
/// `DataSourceNotFound` when the file is missing, `DataParseError` when it
/// is neither JSON records nor a pipe table.
pub fn read_records(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            OpcertError::DataSourceNotFound {
                path: path.to_path_buf(),
            }
        } else {
            OpcertError::Io(e)
        }
    })?;

    let parse_error = |message: String| OpcertError::DataParseError {
        path: path.to_path_buf(),
        message,
    };

    let trimmed = content.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        let value: Value = serde_json::from_str(trimmed).map_err(|e| parse_error(e.to_string()))?;
        return unwrap_records(value).map_err(parse_error);
    }

    if !trimmed.contains('|') {
        return Err(parse_error(
            "expected JSON records or a pipe-delimited table".to_string(),
        ));
    }

    let table = parse_pipe_table(trimmed);
    if table.skipped_rows > 0 {
        tracing::warn!(
            "{}: skipped {} malformed table rows",
            path.display(),
            table.skipped_rows
        );
    }
    tracing::debug!("{}: {} table rows", path.display(), table.records.len());
    Ok(table.records)
}

fn unwrap_records(value: Value) -> std::result::Result<Vec<Value>, String> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut object) => WRAPPER_KEYS
            .iter()
            .find_map(|key| match object.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| {
                format!(
                    "JSON object has no record array under any of: {}",
                    WRAPPER_KEYS.join(", ")
                )
            }),
        _ => Err("expected a JSON array or object".to_string()),
    }
}

fn split_row(line: &str) -> Vec<&str> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(str::trim).collect()
}

fn is_separator(line: &str) -> bool {
    let line = line.trim();
    line.starts_with('-')
        || (line.contains('-') && line.chars().all(|c| matches!(c, '-' | '|' | '+' | ':' | ' ')))
}

/// Parse a pipe-delimited table.
///
/// The first non-blank, non-separator line is the header. Cells are
/// trimmed and empty cells become `null`.
pub fn parse_pipe_table(text: &str) -> PipeTable {
    let mut lines = text
        .lines()
        .filter(|line| !line.trim().is_empty() && !is_separator(line));

    let Some(header_line) = lines.next() else {
        return PipeTable::default();
    };
    let header: Vec<String> = split_row(header_line)
        .into_iter()
        .map(String::from)
        .collect();

    let mut table = PipeTable::default();
    for line in lines {
        let cells = split_row(line);
        if cells.len() != header.len() {
            table.skipped_rows += 1;
            continue;
        }
        let record: Map<String, Value> = header
            .iter()
            .zip(cells)
            .map(|(key, cell)| {
                let value = if cell.is_empty() {
                    Value::Null
                } else {
                    Value::String(cell.to_string())
                };
                (key.clone(), value)
            })
            .collect();
        table.records.push(Value::Object(record));
    }
    table
}
