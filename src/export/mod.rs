//! CSV export of fetched rows.
//!
//! Output is comma-delimited with `\n` between lines and no trailing newline.
//! An empty row set exports as an empty string, not a header-only file.

use chrono::NaiveDate;
use serde_json::Value;
use std::io::Write;

use crate::constants::EXPORT_EXCLUDED_COLUMNS;
use crate::error::DashboardResult;
use crate::registry::ModuleKey;
use crate::store::DataRow;

/// Header columns: keys of the first row minus timestamps and `excluded`.
pub fn header(rows: &[DataRow], excluded: &[&str]) -> Vec<String> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    first
        .keys()
        .filter(|k| !EXPORT_EXCLUDED_COLUMNS.contains(&k.as_str()) && !excluded.contains(&k.as_str()))
        .cloned()
        .collect()
}

/// Renders one cell.
///
/// Strings with a comma, quote or line break are wrapped in quotes with inner
/// quotes doubled. Nested objects and arrays are written as compact JSON and
/// escaped like strings. Null and missing cells are empty.
pub fn escape_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => quote_if_needed(s),
        Some(nested @ (Value::Object(_) | Value::Array(_))) => quote_if_needed(&nested.to_string()),
        Some(scalar) => scalar.to_string(),
    }
}

fn quote_if_needed(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Renders rows as CSV text.
///
/// Columns come from the first row only. If every column of that row is
/// excluded there is no header, and the result is an empty string even when
/// later rows carry other columns.
pub fn to_csv(rows: &[DataRow], excluded: &[&str]) -> String {
    let columns = header(rows, excluded);
    if columns.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        columns
            .iter()
            .map(|c| quote_if_needed(c))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in rows {
        lines.push(
            columns
                .iter()
                .map(|c| escape_field(row.get(c)))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

pub fn write_csv<W: Write>(writer: &mut W, rows: &[DataRow], excluded: &[&str]) -> DashboardResult<()> {
    writer.write_all(to_csv(rows, excluded).as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// `"{module}_export_{YYYY-MM-DD}.csv"`
pub fn export_file_name(key: ModuleKey, date: NaiveDate) -> String {
    format!("{}_export_{}.csv", key, date.format("%Y-%m-%d"))
}
