use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::fetcher::FetchResult;
use crate::registry::ModuleKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row change notification for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct ChangeEvent {
    pub table: String,
    #[serde(rename = "eventType", alias = "type")]
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(table: &str, kind: ChangeKind) -> Self {
        Self {
            table: table.to_string(),
            kind,
        }
    }
}

/// A module re-fetched in response to `trigger`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct RefreshEvent {
    pub module: ModuleKey,
    /// `None` when the refresh was forced after missed notifications.
    pub trigger: Option<ChangeEvent>,
    pub result: FetchResult,
}
