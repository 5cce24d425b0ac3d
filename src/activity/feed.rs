use chrono::NaiveDate;
use futures::future::join_all;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::Arc;

use super::types::{ActivityRecord, ActivityReport, ModuleSlice};
use crate::constants::{ACTIVITY_FEED_LIMIT, ACTIVITY_ROWS_PER_MODULE, PLACEHOLDER_STATUS};
use crate::fetcher::DataFetcher;
use crate::registry::ModuleDescriptor;
use crate::settings::FetchMode;
use crate::store::{DataRow, SelectQuery};

/// Supplies a per-row status in place of the placeholder. Returning `None`
/// falls back to the placeholder.
pub type StatusExtractor = Arc<dyn Fn(&ModuleDescriptor, &DataRow) -> Option<String> + Send + Sync>;

/// Builds the unified "all modules" activity feed.
///
/// Each active module contributes its most recent rows by id. The merged list
/// is ordered by the numeric row id parsed out of each record id, which only
/// tracks recency when every module uses increasing integer keys.
pub struct ActivityFeed {
    fetcher: DataFetcher,
    mode: FetchMode,
    rows_per_module: usize,
    feed_limit: usize,
    status: Option<StatusExtractor>,
    date: Option<NaiveDate>,
}

impl ActivityFeed {
    pub fn new(fetcher: DataFetcher) -> Self {
        Self {
            fetcher,
            mode: FetchMode::default(),
            rows_per_module: ACTIVITY_ROWS_PER_MODULE,
            feed_limit: ACTIVITY_FEED_LIMIT,
            status: None,
            date: None,
        }
    }

    pub fn mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn rows_per_module(mut self, n: usize) -> Self {
        self.rows_per_module = n;
        self
    }

    pub fn feed_limit(mut self, n: usize) -> Self {
        self.feed_limit = n;
        self
    }

    pub fn status_extractor(mut self, extractor: StatusExtractor) -> Self {
        self.status = Some(extractor);
        self
    }

    /// Stamps records with `date` instead of today's local date.
    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub async fn fetch(&self) -> ActivityReport {
        let date = self.date.unwrap_or_else(|| chrono::Local::now().date_naive());
        let registry = self.fetcher.registry();
        let descriptors: Vec<&ModuleDescriptor> = registry
            .active_module_keys()
            .into_iter()
            .filter_map(|key| registry.descriptor(key).ok())
            .collect();

        let slices = match self.mode {
            FetchMode::Sequential => {
                let mut slices = Vec::with_capacity(descriptors.len());
                for descriptor in descriptors {
                    slices.push(self.fetch_slice(descriptor, date).await);
                }
                slices
            }
            FetchMode::Concurrent => {
                join_all(descriptors.into_iter().map(|d| self.fetch_slice(d, date))).await
            }
        };

        let records = merge(&slices, self.feed_limit);
        log::info!(
            "[activity] {} records from {} modules fetched {} ({} failed)",
            records.len(),
            slices.len(),
            self.mode.as_str(),
            slices.iter().filter(|s| s.outcome.is_err()).count()
        );
        ActivityReport { slices, records }
    }

    async fn fetch_slice(&self, descriptor: &ModuleDescriptor, date: NaiveDate) -> ModuleSlice {
        let query = SelectQuery::from(&descriptor.primary_table)
            .count_exact()
            .order("id", false)
            .limit(self.rows_per_module);

        let mut slice = ModuleSlice {
            key: descriptor.key,
            label: descriptor.label.clone(),
            total_records: 0,
            outcome: Ok(Vec::new()),
        };

        match self.fetcher.store().select(&query).await {
            Ok(response) => {
                let total = response.count.unwrap_or(response.rows.len() as u64);
                slice.total_records = total;
                slice.outcome = Ok(response
                    .rows
                    .iter()
                    .filter_map(|row| self.to_record(descriptor, row, total, date))
                    .collect());
            }
            Err(e) => {
                log::warn!("[activity] Skipping {}: {}", descriptor.key, e);
                slice.outcome = Err(e.to_string());
            }
        }
        slice
    }

    fn to_record(
        &self,
        descriptor: &ModuleDescriptor,
        row: &DataRow,
        total: u64,
        date: NaiveDate,
    ) -> Option<ActivityRecord> {
        let row_id = match row.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => {
                log::debug!("[activity] {} row without id skipped", descriptor.key);
                return None;
            }
        };
        let status = self
            .status
            .as_ref()
            .and_then(|extract| extract(descriptor, row))
            .unwrap_or_else(|| PLACEHOLDER_STATUS.to_string());

        Some(ActivityRecord {
            id: format!("{}-{}", descriptor.key, row_id),
            module: descriptor.key,
            module_name: descriptor.label.clone(),
            record_type: descriptor.record_type.clone(),
            status,
            date,
            total_records_in_module: total,
        })
    }
}

/// Concatenates slices in registry order, stable-sorts by descending numeric
/// id and keeps the first `limit`.
pub fn merge(slices: &[ModuleSlice], limit: usize) -> Vec<ActivityRecord> {
    let mut records: Vec<ActivityRecord> = slices
        .iter()
        .flat_map(|s| s.records().iter().cloned())
        .collect();
    records.sort_by(|a, b| {
        b.sort_key()
            .partial_cmp(&a.sort_key())
            .unwrap_or(Ordering::Equal)
    });
    records.truncate(limit);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::RowId;
    use crate::registry::{ModuleKey, ModuleRegistry};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn rows(ids: impl IntoIterator<Item = i64>) -> Vec<DataRow> {
        ids.into_iter()
            .map(|id| json!({"id": id, "state": format!("s{}", id)}).as_object().cloned().unwrap())
            .collect()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn erp_store() -> MemoryStore {
        let registry = ModuleRegistry::erp();
        let mut store = MemoryStore::new();
        for (i, key) in registry.active_module_keys().into_iter().enumerate() {
            let table = &registry.descriptor(key).unwrap().primary_table;
            let start = (i as i64) * 10;
            store = store.with_table(table, rows(start + 1..=start + 8));
        }
        store
    }

    fn feed(store: MemoryStore) -> ActivityFeed {
        let fetcher = DataFetcher::new(Arc::new(ModuleRegistry::erp()), Arc::new(store));
        ActivityFeed::new(fetcher).on_date(date())
    }

    #[tokio::test]
    async fn test_feed_is_bounded_and_sorted() {
        let report = feed(erp_store()).fetch().await;

        assert_eq!(report.records().len(), 20);
        let keys: Vec<RowId> = report.records().iter().map(|r| r.sort_key().unwrap()).collect();
        assert!(keys.windows(2).all(|w| w[0] >= w[1]));
        // hr rows are 81..=88, the five most recent lead the feed
        assert_eq!(report.records()[0].id, "hr-88");
        assert_eq!(report.records()[0].module_name, "Human Resources");
        assert_eq!(report.records()[0].record_type, "Employee");
        assert_eq!(report.records()[0].status, "Completed");
        assert_eq!(report.records()[0].total_records_in_module, 8);
        assert_eq!(report.records()[0].date, date());
    }

    #[tokio::test]
    async fn test_single_module_failure_is_swallowed() {
        let store = erp_store();
        store.fail_table("shipments");
        let report = feed(store).feed_limit(100).fetch().await;

        assert_eq!(report.failed_modules(), vec![ModuleKey::SupplyChain]);
        assert_eq!(report.records().len(), 8 * 5);
        assert!(report.records().iter().all(|r| r.module != ModuleKey::SupplyChain));
        let keys: Vec<RowId> = report.records().iter().map(|r| r.sort_key().unwrap()).collect();
        assert!(keys.windows(2).all(|w| w[0] >= w[1]));

        let overview = report.overview();
        assert_eq!(overview.len(), 9);
        assert!(overview[3].error.is_some());
        assert_eq!(overview[0].total_records, 8);
    }

    #[tokio::test]
    async fn test_ties_keep_registry_order() {
        let store = MemoryStore::new()
            .with_table("inventory_items", rows([7, 3]))
            .with_table("support_tickets", rows([7, 5]))
            .with_table("purchase_orders", rows([7]));
        let report = feed(store).fetch().await;

        let ids: Vec<&str> = report.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "inventory-7",
                "customer_service-7",
                "procurement-7",
                "customer_service-5",
                "inventory-3"
            ]
        );
        // modules with no table fail softly
        assert_eq!(report.failed_modules().len(), 6);
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let sequential = feed(erp_store()).fetch().await;
        let concurrent = feed(erp_store()).mode(FetchMode::Concurrent).fetch().await;
        assert_eq!(sequential, concurrent);
    }

    #[tokio::test]
    async fn test_status_extractor_overrides_placeholder() {
        let extractor: StatusExtractor = Arc::new(|descriptor: &ModuleDescriptor, row: &DataRow| {
            if descriptor.key == ModuleKey::Inventory {
                row.get("state").and_then(|v| v.as_str()).map(String::from)
            } else {
                None
            }
        });
        let store = MemoryStore::new()
            .with_table("inventory_items", rows([2]))
            .with_table("sales_orders", rows([1]));
        let report = feed(store).status_extractor(extractor).fetch().await;

        assert_eq!(report.records()[0].status, "s2");
        assert_eq!(report.records()[1].status, "Completed");
    }

    #[test]
    fn test_non_numeric_ids_sort_last() {
        let record = |id: &str| ActivityRecord {
            id: id.to_string(),
            module: ModuleKey::Finance,
            module_name: "Finance".to_string(),
            record_type: "Transaction".to_string(),
            status: "Completed".to_string(),
            date: date(),
            total_records_in_module: 3,
        };
        let slices = vec![ModuleSlice {
            key: ModuleKey::Finance,
            label: "Finance".to_string(),
            total_records: 3,
            outcome: Ok(vec![record("finance-abc"), record("finance-2"), record("finance-10")]),
        }];
        let ids: Vec<String> = merge(&slices, 20).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["finance-10", "finance-2", "finance-abc"]);
    }

    #[tokio::test]
    async fn test_bigint_ids_order_exactly() {
        let big = |id: i64| vec![json!({ "id": id }).as_object().cloned().unwrap()];
        let store = MemoryStore::new()
            .with_table("inventory_items", big(9_007_199_254_740_992))
            .with_table("sales_orders", big(9_007_199_254_740_993));
        let report = feed(store).fetch().await;

        let ids: Vec<&str> = report.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["sales-9007199254740993", "inventory-9007199254740992"]);
    }
}
