use std::cmp::Ordering as CmpOrdering;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use super::types::{DataRow, Predicate, SelectQuery, StoreError, StoreResponse};
use super::DataStore;
use serde_json::Value;

/// In-process store that evaluates the same query shape as the hosted API.
///
/// Equality compares numbers numerically and everything else exactly, so
/// `status = "open"` never matches `"reopened"`. Ordering puts nulls last when
/// ascending and first when descending, matching Postgres defaults.
///
/// A panic while a lock is held does not lose the data: later calls recover
/// the guard from the poisoned lock and keep going.
#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<HashMap<String, Vec<DataRow>>>,
  failing: RwLock<HashSet<String>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_table(self, table: &str, rows: Vec<DataRow>) -> Self {
    self
      .tables
      .write()
      .unwrap_or_else(|e| e.into_inner())
      .insert(table.to_string(), rows);
    self
  }

  /// Appends a row, creating the table if needed.
  pub fn insert(&self, table: &str, row: DataRow) {
    self
      .tables
      .write()
      .unwrap_or_else(|e| e.into_inner())
      .entry(table.to_string())
      .or_default()
      .push(row);
  }

  /// Makes every select against `table` fail until cleared.
  pub fn fail_table(&self, table: &str) {
    self
      .failing
      .write()
      .unwrap_or_else(|e| e.into_inner())
      .insert(table.to_string());
  }

  pub fn clear_failures(&self) {
    self.failing.write().unwrap_or_else(|e| e.into_inner()).clear();
  }
}

#[async_trait::async_trait]
impl DataStore for MemoryStore {
  async fn select(&self, query: &SelectQuery) -> Result<StoreResponse, StoreError> {
    let failing = self
      .failing
      .read()
      .unwrap_or_else(|e| e.into_inner())
      .contains(&query.table);
    if failing {
      return Err(StoreError::Unavailable(format!(
        "simulated failure for {}",
        query.table
      )));
    }

    let tables = self.tables.read().unwrap_or_else(|e| e.into_inner());
    let rows = tables
      .get(&query.table)
      .ok_or_else(|| StoreError::UnknownTable(query.table.clone()))?;

    let mut matched: Vec<&DataRow> = rows
      .iter()
      .filter(|row| query.predicates.iter().all(|p| matches_predicate(row, p)))
      .collect();
    let total = matched.len() as u64;

    if let Some(order) = &query.order {
      matched.sort_by(|a, b| {
        let ord = compare_values(a.get(&order.column), b.get(&order.column));
        if order.ascending {
          ord
        } else {
          ord.reverse()
        }
      });
    }
    if let Some(limit) = query.limit {
      matched.truncate(limit);
    }

    let rows = matched
      .into_iter()
      .map(|row| project(row, &query.columns))
      .collect();

    Ok(StoreResponse {
      rows,
      count: query.count_exact.then_some(total),
    })
  }
}

fn matches_predicate(row: &DataRow, predicate: &Predicate) -> bool {
  let actual = row.get(predicate.column());
  match predicate {
    Predicate::Eq { value, .. } => actual.map_or(false, |a| values_equal(a, value)),
    Predicate::In { values, .. } => {
      actual.map_or(false, |a| values.iter().any(|v| values_equal(a, v)))
    }
  }
}

fn values_equal(a: &Value, b: &Value) -> bool {
  match (a.as_f64(), b.as_f64()) {
    (Some(x), Some(y)) => x == y,
    _ => a == b,
  }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
  let a = a.filter(|v| !v.is_null());
  let b = b.filter(|v| !v.is_null());
  match (a, b) {
    (None, None) => CmpOrdering::Equal,
    (None, Some(_)) => CmpOrdering::Greater,
    (Some(_), None) => CmpOrdering::Less,
    (Some(x), Some(y)) => match (x.as_f64(), y.as_f64()) {
      (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(CmpOrdering::Equal),
      _ => x.to_string().cmp(&y.to_string()),
    },
  }
}

// Nested `rel!hint(cols)` fragments keep the row's embedded `rel` value as-is.
fn project(row: &DataRow, columns: &[String]) -> DataRow {
  if columns.is_empty() || columns.iter().any(|c| c == "*") {
    return row.clone();
  }
  let mut out = DataRow::new();
  for column in columns {
    let name = match column.split_once('(') {
      Some((head, _)) => head.split('!').next().unwrap_or(head),
      None => column.as_str(),
    };
    if let Some(value) = row.get(name) {
      out.insert(name.to_string(), value.clone());
    }
  }
  out
}
