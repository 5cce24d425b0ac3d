use chrono::NaiveDate;
use std::cmp::Ordering;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::registry::ModuleKey;

/// Normalized, lossy projection of one row for the cross-module feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct ActivityRecord {
    /// `"{module_key}-{row id}"`.
    pub id: String,
    pub module: ModuleKey,
    pub module_name: String,
    pub record_type: String,
    pub status: String,
    #[ts(type = "string")]
    pub date: NaiveDate,
    pub total_records_in_module: u64,
}

impl ActivityRecord {
    /// Numeric row id parsed back out of `id`, used as the feed's sort key.
    /// Non-numeric ids yield `None` and sort after every numeric id.
    pub fn sort_key(&self) -> Option<RowId> {
        let raw = self
            .id
            .strip_prefix(self.module.as_str())
            .and_then(|rest| rest.strip_prefix('-'))?;
        if let Ok(n) = raw.parse::<i128>() {
            return Some(RowId::Int(n));
        }
        raw.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(RowId::Float)
    }
}

/// Numeric row id. Integers compare exactly so bigint keys past 2^53 stay
/// distinct; mixed or fractional ids compare as `f64`.
#[derive(Debug, Clone, Copy)]
pub enum RowId {
    Int(i128),
    Float(f64),
}

impl RowId {
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(n) => n as f64,
            Self::Float(n) => n,
        }
    }
}

impl PartialEq for RowId {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for RowId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

/// What one module contributed to the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSlice {
    pub key: ModuleKey,
    pub label: String,
    pub total_records: u64,
    pub outcome: Result<Vec<ActivityRecord>, String>,
}

impl ModuleSlice {
    pub fn records(&self) -> &[ActivityRecord] {
        match &self.outcome {
            Ok(records) => records.as_slice(),
            Err(_) => &[],
        }
    }
}

/// Per-module record counts for the overview cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct ModuleOverview {
    pub key: ModuleKey,
    pub label: String,
    pub total_records: u64,
    pub error: Option<String>,
}

/// Merged feed plus the per-module outcomes it was built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityReport {
    pub slices: Vec<ModuleSlice>,
    pub records: Vec<ActivityRecord>,
}

impl ActivityReport {
    pub fn records(&self) -> &[ActivityRecord] {
        &self.records
    }

    pub fn failed_modules(&self) -> Vec<ModuleKey> {
        self.slices
            .iter()
            .filter(|s| s.outcome.is_err())
            .map(|s| s.key)
            .collect()
    }

    pub fn overview(&self) -> Vec<ModuleOverview> {
        self.slices
            .iter()
            .map(|s| ModuleOverview {
                key: s.key,
                label: s.label.clone(),
                total_records: s.total_records,
                error: s.outcome.as_ref().err().cloned(),
            })
            .collect()
    }
}
