//! Column statistics over a fetched page.

use serde_json::Value;
use std::collections::BTreeMap;

use super::types::Aggregation;
use crate::store::DataRow;

/// Resolves `column` on a row, following a dotted `relation.column` path into
/// embedded objects when there is no top-level key of that name.
pub fn column_value<'a>(row: &'a DataRow, column: &str) -> Option<&'a Value> {
    if let Some(value) = row.get(column) {
        return Some(value);
    }
    let mut parts = column.split('.');
    let mut current = row.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Numeric reading of a cell: JSON numbers and numeric strings that parse to a
/// finite value. Everything else (null, text, booleans, objects) is skipped.
pub fn numeric_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

pub fn aggregate_column(rows: &[DataRow], column: &str) -> Aggregation {
    let mut agg = Aggregation::default();
    let mut values = rows
        .iter()
        .filter_map(|row| column_value(row, column))
        .filter_map(numeric_value);

    let Some(first) = values.next() else {
        return agg;
    };
    agg.sum = first;
    agg.min = first;
    agg.max = first;
    agg.count = 1;

    for v in values {
        agg.sum += v;
        agg.min = agg.min.min(v);
        agg.max = agg.max.max(v);
        agg.count += 1;
    }
    agg.avg = agg.sum / agg.count as f64;
    agg
}

/// Aggregations for each listed column, keyed by column name.
pub fn compute_aggregations<S: AsRef<str>>(rows: &[DataRow], columns: &[S]) -> BTreeMap<String, Aggregation> {
    columns
        .iter()
        .map(|c| (c.as_ref().to_string(), aggregate_column(rows, c.as_ref())))
        .collect()
}
