use serde_json::Value;

/// One row as returned by the store: column name → scalar, nested object from
/// an expanded join, or null. Column order follows the store's response.
pub type DataRow = serde_json::Map<String, Value>;

/// Filter applied server-side.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
  Eq { column: String, value: Value },
  In { column: String, values: Vec<Value> },
}

impl Predicate {
  pub fn column(&self) -> &str {
    match self {
      Predicate::Eq { column, .. } | Predicate::In { column, .. } => column,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
  pub column: String,
  pub ascending: bool,
}

/// A table-scoped select, mirroring the hosted client's builder.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
  pub table: String,
  /// Plain columns or nested `relation(col,...)` fragments. Empty means `*`.
  pub columns: Vec<String>,
  pub count_exact: bool,
  pub predicates: Vec<Predicate>,
  pub order: Option<Ordering>,
  pub limit: Option<usize>,
}

impl SelectQuery {
  pub fn from(table: &str) -> Self {
    Self {
      table: table.to_string(),
      columns: Vec::new(),
      count_exact: false,
      predicates: Vec::new(),
      order: None,
      limit: None,
    }
  }

  pub fn select<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
    self.columns = columns.iter().map(|c| c.as_ref().to_string()).collect();
    self
  }

  pub fn count_exact(mut self) -> Self {
    self.count_exact = true;
    self
  }

  pub fn eq(mut self, column: &str, value: Value) -> Self {
    self.predicates.push(Predicate::Eq {
      column: column.to_string(),
      value,
    });
    self
  }

  pub fn in_(mut self, column: &str, values: Vec<Value>) -> Self {
    self.predicates.push(Predicate::In {
      column: column.to_string(),
      values,
    });
    self
  }

  pub fn order(mut self, column: &str, ascending: bool) -> Self {
    self.order = Some(Ordering {
      column: column.to_string(),
      ascending,
    });
    self
  }

  pub fn limit(mut self, n: usize) -> Self {
    self.limit = Some(n);
    self
  }

  /// Renders the select list the way the hosted API expects it.
  pub fn select_clause(&self) -> String {
    if self.columns.is_empty() {
      "*".to_string()
    } else {
      self.columns.join(",")
    }
  }
}

/// Rows plus the exact count when one was requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreResponse {
  pub rows: Vec<DataRow>,
  pub count: Option<u64>,
}

/// Errors reported by a data store implementation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
  #[error("Request failed: {0}")]
  Network(String),

  #[error("Store rejected query ({status}): {message}")]
  Rejected { status: u16, message: String },

  #[error("Failed to decode response: {0}")]
  Decode(String),

  #[error("Table not found: {0}")]
  UnknownTable(String),

  #[error("Store unavailable: {0}")]
  Unavailable(String),
}
