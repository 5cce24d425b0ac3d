//! Module keys and the static descriptors that say how each module is queried.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::DashboardError;

/// Closed set of module identifiers accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
#[serde(rename_all = "snake_case")]
pub enum ModuleKey {
    Inventory,
    CustomerService,
    Procurement,
    SupplyChain,
    Finance,
    Ecommerce,
    Sales,
    ProjectManagement,
    Hr,
    /// Synthetic key for the cross-module overview. Has no table of its own.
    All,
}

impl ModuleKey {
    pub const VALUES: [ModuleKey; 10] = [
        ModuleKey::Inventory,
        ModuleKey::CustomerService,
        ModuleKey::Procurement,
        ModuleKey::SupplyChain,
        ModuleKey::Finance,
        ModuleKey::Ecommerce,
        ModuleKey::Sales,
        ModuleKey::ProjectManagement,
        ModuleKey::Hr,
        ModuleKey::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inventory => "inventory",
            Self::CustomerService => "customer_service",
            Self::Procurement => "procurement",
            Self::SupplyChain => "supply_chain",
            Self::Finance => "finance",
            Self::Ecommerce => "ecommerce",
            Self::Sales => "sales",
            Self::ProjectManagement => "project_management",
            Self::Hr => "hr",
            Self::All => "all",
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleKey {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleKey::VALUES
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| DashboardError::ModuleNotConfigured(s.to_string()))
    }
}

/// A single foreign-key expansion, rendered as `table!hint(col1,col2)` in the
/// select list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct JoinSpec {
    pub foreign_table: String,
    /// Foreign-key column used to disambiguate the embedding. Empty lets the
    /// store infer the relationship.
    pub predicate: String,
    pub selected_columns: Vec<String>,
}

impl JoinSpec {
    pub fn new(foreign_table: &str, predicate: &str, selected_columns: &[&str]) -> Self {
        Self {
            foreign_table: foreign_table.to_string(),
            predicate: predicate.to_string(),
            selected_columns: selected_columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Renders the nested-select fragment for this join.
    pub fn to_select(&self) -> String {
        let target = if self.predicate.is_empty() {
            self.foreign_table.clone()
        } else {
            format!("{}!{}", self.foreign_table, self.predicate)
        };
        format!("{}({})", target, self.selected_columns.join(","))
    }
}

/// Static configuration record describing how to query one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "dashboard.ts")]
pub struct ModuleDescriptor {
    pub key: ModuleKey,
    /// Human-facing module name, e.g. "Customer Service".
    pub label: String,
    /// Record type shown for this module's rows in the activity feed.
    pub record_type: String,
    /// Empty for the synthetic `all` entry.
    pub primary_table: String,
    pub related_tables: Vec<String>,
    /// Plain columns or dotted `relation.column` paths.
    pub display_columns: Vec<String>,
    pub aggregate_columns: Vec<String>,
    pub joins: Vec<JoinSpec>,
}

impl ModuleDescriptor {
    pub fn new(key: ModuleKey, label: &str, record_type: &str, primary_table: &str) -> Self {
        Self {
            key,
            label: label.to_string(),
            record_type: record_type.to_string(),
            primary_table: primary_table.to_string(),
            related_tables: Vec::new(),
            display_columns: Vec::new(),
            aggregate_columns: Vec::new(),
            joins: Vec::new(),
        }
    }

    pub fn related(mut self, tables: &[&str]) -> Self {
        self.related_tables = tables.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn display(mut self, columns: &[&str]) -> Self {
        self.display_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn aggregate(mut self, columns: &[&str]) -> Self {
        self.aggregate_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn join(mut self, join: JoinSpec) -> Self {
        self.joins.push(join);
        self
    }

    pub fn is_synthetic(&self) -> bool {
        self.key.is_synthetic() || self.primary_table.is_empty()
    }

    /// Whether a change on `table` affects this module's data.
    pub fn watches(&self, table: &str) -> bool {
        !self.is_synthetic()
            && (self.primary_table == table || self.related_tables.iter().any(|t| t == table))
    }

    /// Builds the store select list.
    ///
    /// Plain display columns are selected as-is. Dotted paths are grouped by
    /// relation into nested selects and merged with any declared join on the
    /// same foreign table, so `warehouses.name` and a join on `warehouses`
    /// produce a single `warehouses(...)` fragment.
    pub fn select_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        let mut nested: Vec<JoinSpec> = self.joins.clone();

        for column in &self.display_columns {
            match column.split_once('.') {
                Some((relation, field)) => {
                    match nested.iter_mut().find(|j| j.foreign_table == relation) {
                        Some(join) => {
                            if !join.selected_columns.iter().any(|c| c == field) {
                                join.selected_columns.push(field.to_string());
                            }
                        }
                        None => nested.push(JoinSpec::new(relation, "", &[field])),
                    }
                }
                None => {
                    if !columns.contains(column) {
                        columns.push(column.clone());
                    }
                }
            }
        }

        columns.extend(nested.iter().map(JoinSpec::to_select));
        columns
    }
}
