//! Error types for the dashboard core.
//!
//! Only configuration problems and unknown modules surface as `Err`. Failures
//! reported by the external store are folded into `FetchResult::error` by the
//! fetcher and never cross into presentation code.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Errors raised by the registry, fetcher and exporter.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
#[serde(tag = "type", content = "message")]
pub enum DashboardError {
    /// The module key is not in the registry, or names the synthetic `all`
    /// entry which has no table to query.
    #[serde(rename = "ModuleNotConfigured")]
    #[error("Module not configured: {0}")]
    ModuleNotConfigured(String),

    /// Two descriptors were registered under the same key.
    #[serde(rename = "DuplicateModule")]
    #[error("Module registered twice: {0}")]
    DuplicateModule(String),

    /// Query options were rejected before reaching the store.
    #[serde(rename = "InvalidOptions")]
    #[error("Invalid query options: {0}")]
    InvalidOptions(String),

    /// Store settings are missing or malformed.
    #[serde(rename = "Configuration")]
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The external store failed. Only returned by callers that opt out of
    /// the soft-failure result shape.
    #[serde(rename = "ExternalStore")]
    #[error("External store error: {0}")]
    ExternalStore(String),

    /// Writing an export failed.
    #[serde(rename = "Export")]
    #[error("Export failed: {0}")]
    Export(String),
}

/// Result type alias for dashboard operations.
pub type DashboardResult<T> = Result<T, DashboardError>;

impl From<crate::store::StoreError> for DashboardError {
    fn from(e: crate::store::StoreError) -> Self {
        DashboardError::ExternalStore(e.to_string())
    }
}

impl From<std::io::Error> for DashboardError {
    fn from(e: std::io::Error) -> Self {
        DashboardError::Export(e.to_string())
    }
}
