//! Data fetcher: one counted query per module, with aggregations.
//!
//! Store failures never escape as `Err`. They become `FetchResult::error`, so a
//! dashboard assembling many modules always receives a well-formed result for
//! each one. Only caller mistakes (unknown module, bad options) are `Err`.

pub mod aggregate;
pub mod types;

pub use types::*;

use std::sync::Arc;

use crate::error::{DashboardError, DashboardResult};
use crate::registry::{ModuleDescriptor, ModuleKey, ModuleRegistry};
use crate::store::{DataStore, SelectQuery};

#[derive(Clone)]
pub struct DataFetcher {
    registry: Arc<ModuleRegistry>,
    store: Arc<dyn DataStore>,
}

impl DataFetcher {
    pub fn new(registry: Arc<ModuleRegistry>, store: Arc<dyn DataStore>) -> Self {
        Self { registry, store }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn DataStore> {
        &self.store
    }

    /// Resolves a key to a queryable descriptor.
    pub fn resolve(&self, key: ModuleKey) -> DashboardResult<&ModuleDescriptor> {
        let descriptor = self.registry.descriptor(key)?;
        if descriptor.is_synthetic() {
            return Err(DashboardError::ModuleNotConfigured(key.to_string()));
        }
        Ok(descriptor)
    }

    /// Builds the counted select for a module page.
    pub fn build_query(descriptor: &ModuleDescriptor, options: &QueryOptions) -> SelectQuery {
        let mut query = SelectQuery::from(&descriptor.primary_table)
            .select(&descriptor.select_columns())
            .count_exact();

        for (column, value) in &options.filters {
            if value.is_null() {
                continue;
            }
            query = query.eq(column, value.clone());
        }
        for (column, values) in &options.filters_in {
            if values.is_empty() {
                continue;
            }
            query = query.in_(column, values.clone());
        }

        query
            .order(&options.order_by_column, options.ascending)
            .limit(options.limit)
    }

    pub async fn fetch(&self, key: ModuleKey, options: &QueryOptions) -> DashboardResult<FetchResult> {
        options.validate()?;
        let descriptor = self.resolve(key)?;
        let query = Self::build_query(descriptor, options);

        log::debug!(
            "[fetcher] {} → {} (limit {}, {} filters)",
            key,
            descriptor.primary_table,
            options.limit,
            query.predicates.len()
        );

        match self.store.select(&query).await {
            Ok(response) => {
                let total_count = response.count.unwrap_or(response.rows.len() as u64);
                let aggregations =
                    aggregate::compute_aggregations(&response.rows, &descriptor.aggregate_columns);
                log::info!(
                    "[fetcher] {}: {} of {} rows",
                    key,
                    response.rows.len(),
                    total_count
                );
                Ok(FetchResult {
                    rows: response.rows,
                    total_count,
                    aggregations,
                    error: None,
                })
            }
            Err(e) => {
                log::warn!("[fetcher] {} fetch failed: {}", key, e);
                Ok(FetchResult::failed(e.to_string()))
            }
        }
    }

    /// Same as `fetch`, taking the module's wire name.
    pub async fn fetch_by_name(&self, name: &str, options: &QueryOptions) -> DashboardResult<FetchResult> {
        let key: ModuleKey = name.parse()?;
        self.fetch(key, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ModuleDescriptor;
    use crate::store::{DataRow, MemoryStore};
    use serde_json::{json, Value};

    fn row(value: Value) -> DataRow {
        value.as_object().cloned().unwrap()
    }

    fn registry() -> Arc<ModuleRegistry> {
        Arc::new(
            ModuleRegistry::new(vec![
                ModuleDescriptor::new(ModuleKey::CustomerService, "Customer Service", "Ticket", "tickets")
                    .display(&["id", "status", "rating"])
                    .aggregate(&["rating"]),
                ModuleDescriptor::new(ModuleKey::Sales, "Sales", "Sales Order", "sales_orders")
                    .display(&["id", "total"])
                    .aggregate(&["total"]),
                ModuleDescriptor::new(ModuleKey::All, "All Modules", "Record", ""),
            ])
            .unwrap(),
        )
    }

    fn fetcher(store: MemoryStore) -> DataFetcher {
        DataFetcher::new(registry(), Arc::new(store))
    }

    fn tickets(n: i64) -> Vec<DataRow> {
        (1..=n)
            .map(|id| {
                let status = if id % 3 == 0 { "open" } else { "closed" };
                row(json!({"id": id, "status": status, "rating": id % 5, "note": "x"}))
            })
            .collect()
    }

    #[tokio::test]
    async fn test_limit_caps_rows_but_not_total() {
        let fetcher = fetcher(MemoryStore::new().with_table("tickets", tickets(25)));
        let result = fetcher
            .fetch(ModuleKey::CustomerService, &QueryOptions::default().limit(10))
            .await
            .unwrap();

        assert!(result.is_ok());
        assert_eq!(result.rows.len(), 10);
        assert_eq!(result.total_count, 25);
        // default ordering is id descending
        assert_eq!(result.rows[0]["id"], json!(25));
        // only display columns are selected
        assert!(result.rows[0].get("note").is_none());
    }

    #[tokio::test]
    async fn test_equality_filter_is_exact() {
        let mut rows = tickets(9);
        rows.push(row(json!({"id": 10, "status": "reopened", "rating": 1})));
        let fetcher = fetcher(MemoryStore::new().with_table("tickets", rows));

        let options = QueryOptions::default()
            .filter("status", json!("open"))
            .filter("rating", Value::Null);
        let result = fetcher.fetch(ModuleKey::CustomerService, &options).await.unwrap();

        assert_eq!(result.total_count, 3);
        assert!(result.rows.iter().all(|r| r["status"] == json!("open")));
    }

    #[tokio::test]
    async fn test_in_filter() {
        let fetcher = fetcher(MemoryStore::new().with_table("tickets", tickets(10)));
        let options = QueryOptions::default()
            .filter_in("id", vec![json!(2), json!(4), json!(40)])
            .filter_in("status", vec![])
            .order_by("id", true);
        let result = fetcher.fetch(ModuleKey::CustomerService, &options).await.unwrap();
        let ids: Vec<_> = result.rows.iter().map(|r| r["id"].clone()).collect();
        assert_eq!(ids, vec![json!(2), json!(4)]);
    }

    #[tokio::test]
    async fn test_aggregations_only_for_aggregate_columns() {
        let store = MemoryStore::new().with_table(
            "sales_orders",
            vec![
                row(json!({"id": 1, "total": 10})),
                row(json!({"id": 2, "total": "20"})),
                row(json!({"id": 3, "total": "abc"})),
                row(json!({"id": 4, "total": null})),
                row(json!({"id": 5, "total": 5})),
            ],
        );
        let result = fetcher(store)
            .fetch(ModuleKey::Sales, &QueryOptions::default())
            .await
            .unwrap();

        assert_eq!(result.aggregations.len(), 1);
        let total = result.aggregations["total"];
        assert_eq!(total.count, 3);
        assert_eq!(total.sum, 35.0);
        assert_eq!(total.min, 5.0);
        assert_eq!(total.max, 20.0);
    }

    #[tokio::test]
    async fn test_store_error_becomes_soft_failure() {
        let store = MemoryStore::new().with_table("tickets", tickets(3));
        store.fail_table("tickets");
        let result = fetcher(store)
            .fetch(ModuleKey::CustomerService, &QueryOptions::default())
            .await
            .unwrap();

        assert!(result.rows.is_empty());
        assert_eq!(result.total_count, 0);
        assert!(result.error.unwrap().contains("simulated failure"));
    }

    #[tokio::test]
    async fn test_missing_table_is_soft_failure() {
        let result = fetcher(MemoryStore::new())
            .fetch(ModuleKey::Sales, &QueryOptions::default())
            .await
            .unwrap();
        assert_eq!(result.error.as_deref(), Some("Table not found: sales_orders"));
    }

    #[tokio::test]
    async fn test_unconfigured_and_synthetic_modules_fail() {
        let fetcher = fetcher(MemoryStore::new());
        let options = QueryOptions::default();
        assert_eq!(
            fetcher.fetch(ModuleKey::Hr, &options).await.unwrap_err(),
            DashboardError::ModuleNotConfigured("hr".to_string())
        );
        assert_eq!(
            fetcher.fetch(ModuleKey::All, &options).await.unwrap_err(),
            DashboardError::ModuleNotConfigured("all".to_string())
        );
        assert!(matches!(
            fetcher.fetch_by_name("warehouse", &options).await,
            Err(DashboardError::ModuleNotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn test_zero_limit_rejected() {
        let fetcher = fetcher(MemoryStore::new().with_table("tickets", tickets(3)));
        let err = fetcher
            .fetch(ModuleKey::CustomerService, &QueryOptions::default().limit(0))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::InvalidOptions(_)));
    }

    #[test]
    fn test_build_query_shape() {
        let registry = ModuleRegistry::erp();
        let descriptor = registry.descriptor(ModuleKey::Inventory).unwrap();
        let query = DataFetcher::build_query(
            descriptor,
            &QueryOptions::default().filter("status", json!("active")).order_by("name", true),
        );
        assert_eq!(query.table, "inventory_items");
        assert!(query.count_exact);
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.predicates.len(), 1);
        assert_eq!(query.columns.last().unwrap(), "warehouses!warehouse_id(name,location)");
    }
}
