//! Cross-module data aggregation and reporting core for the ERP dashboard.
//!
//! Screens pick a module, fetch one counted page with aggregations, merge a
//! recent-activity feed across every module, and export rows as CSV. The hosted
//! relational store sits behind [`store::DataStore`].
pub mod activity;
pub mod constants;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod realtime;
pub mod registry;
pub mod settings;
pub mod store;

use std::sync::Arc;

use error::DashboardResult;
use fetcher::DataFetcher;
use registry::ModuleRegistry;
use store::SupabaseStore;

/// Builds a fetcher over the built-in module catalog and the hosted store
/// configured in the environment.
pub fn connect_from_env() -> DashboardResult<DataFetcher> {
    let settings = settings::load_store_settings()?;
    log::info!("[setup] Using data store at {}", settings.url);
    let store = SupabaseStore::new(settings)?;
    Ok(DataFetcher::new(Arc::new(ModuleRegistry::erp()), Arc::new(store)))
}
