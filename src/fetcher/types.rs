use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::constants::{DEFAULT_LIMIT, DEFAULT_ORDER_COLUMN};
use crate::error::{DashboardError, DashboardResult};
use crate::store::DataRow;

/// Paging, ordering and filtering for a single module fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
#[serde(default)]
pub struct QueryOptions {
    pub limit: usize,
    pub order_by_column: String,
    pub ascending: bool,
    /// Equality filters. Null values are ignored.
    #[ts(type = "Record<string, any>")]
    pub filters: BTreeMap<String, Value>,
    /// Membership filters (`column IN (values)`). Empty lists are ignored.
    #[ts(type = "Record<string, Array<any>>")]
    pub filters_in: BTreeMap<String, Vec<Value>>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            order_by_column: DEFAULT_ORDER_COLUMN.to_string(),
            ascending: false,
            filters: BTreeMap::new(),
            filters_in: BTreeMap::new(),
        }
    }
}

impl QueryOptions {
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order_by_column = column.to_string();
        self.ascending = ascending;
        self
    }

    pub fn filter(mut self, column: &str, value: Value) -> Self {
        self.filters.insert(column.to_string(), value);
        self
    }

    pub fn filter_in(mut self, column: &str, values: Vec<Value>) -> Self {
        self.filters_in.insert(column.to_string(), values);
        self
    }

    pub fn validate(&self) -> DashboardResult<()> {
        if self.limit == 0 {
            return Err(DashboardError::InvalidOptions("limit must be greater than 0".to_string()));
        }
        if self.order_by_column.trim().is_empty() {
            return Err(DashboardError::InvalidOptions("order column must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Summary statistics over the parseable values of one column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct Aggregation {
    pub sum: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    /// Number of parseable values; may be less than the row count.
    pub count: usize,
}

/// Outcome of one module fetch. Store failures land in `error`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct FetchResult {
    #[ts(type = "Array<Record<string, any>>")]
    pub rows: Vec<DataRow>,
    pub total_count: u64,
    pub aggregations: BTreeMap<String, Aggregation>,
    pub error: Option<String>,
}

impl FetchResult {
    pub fn failed(message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
