//! Module registry: the static catalog of module → table mappings.
//!
//! The registry is built once as an immutable value and handed to the fetcher
//! explicitly. `default_registry()` exists for the binary; library callers and
//! tests construct their own.

pub mod catalog;
pub mod types;

pub use types::*;

use crate::error::{DashboardError, DashboardResult};
use once_cell::sync::Lazy;
use std::collections::HashMap;

static DEFAULT_REGISTRY: Lazy<ModuleRegistry> = Lazy::new(|| {
    ModuleRegistry::new(catalog::erp_descriptors()).expect("built-in module catalog has unique keys")
});

/// Process-wide registry holding the built-in ERP catalog.
pub fn default_registry() -> &'static ModuleRegistry {
    &DEFAULT_REGISTRY
}

#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    descriptors: Vec<ModuleDescriptor>,
    index: HashMap<ModuleKey, usize>,
}

impl ModuleRegistry {
    /// Builds a registry, rejecting duplicate keys. Declaration order is kept.
    pub fn new(descriptors: Vec<ModuleDescriptor>) -> DashboardResult<Self> {
        let mut index = HashMap::with_capacity(descriptors.len());
        for (position, descriptor) in descriptors.iter().enumerate() {
            if index.insert(descriptor.key, position).is_some() {
                return Err(DashboardError::DuplicateModule(descriptor.key.to_string()));
            }
        }
        Ok(Self { descriptors, index })
    }

    pub fn erp() -> Self {
        default_registry().clone()
    }

    pub fn descriptor(&self, key: ModuleKey) -> DashboardResult<&ModuleDescriptor> {
        self.index
            .get(&key)
            .map(|&i| &self.descriptors[i])
            .ok_or_else(|| DashboardError::ModuleNotConfigured(key.to_string()))
    }

    /// Looks a descriptor up by its wire name.
    pub fn descriptor_by_name(&self, name: &str) -> DashboardResult<&ModuleDescriptor> {
        let key: ModuleKey = name.parse()?;
        self.descriptor(key)
    }

    /// Keys in declaration order, without the synthetic `all` entry.
    pub fn active_module_keys(&self) -> Vec<ModuleKey> {
        self.descriptors
            .iter()
            .filter(|d| !d.is_synthetic())
            .map(|d| d.key)
            .collect()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ModuleDescriptor> {
        self.descriptors.iter()
    }

    /// Modules whose primary or related tables include `table`.
    pub fn modules_watching(&self, table: &str) -> Vec<ModuleKey> {
        self.descriptors
            .iter()
            .filter(|d| d.watches(table))
            .map(|d| d.key)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_key_matches_lookup() {
        let registry = ModuleRegistry::erp();
        for key in ModuleKey::VALUES {
            let descriptor = registry.descriptor(key).unwrap();
            assert_eq!(descriptor.key, key);
        }
    }

    #[test]
    fn test_unregistered_key_is_not_configured() {
        let registry = ModuleRegistry::new(vec![ModuleDescriptor::new(
            ModuleKey::Sales,
            "Sales",
            "Sales Order",
            "sales_orders",
        )])
        .unwrap();

        let err = registry.descriptor(ModuleKey::Hr).unwrap_err();
        assert_eq!(err, DashboardError::ModuleNotConfigured("hr".to_string()));
    }

    #[test]
    fn test_unknown_name_is_not_configured() {
        let registry = ModuleRegistry::erp();
        assert!(matches!(
            registry.descriptor_by_name("payroll_v2"),
            Err(DashboardError::ModuleNotConfigured(name)) if name == "payroll_v2"
        ));
        assert_eq!(
            registry.descriptor_by_name("supply_chain").unwrap().primary_table,
            "shipments"
        );
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let result = ModuleRegistry::new(vec![
            ModuleDescriptor::new(ModuleKey::Hr, "HR", "Employee", "employees"),
            ModuleDescriptor::new(ModuleKey::Hr, "HR again", "Employee", "staff"),
        ]);
        assert_eq!(result.unwrap_err(), DashboardError::DuplicateModule("hr".to_string()));
    }

    #[test]
    fn test_active_keys_follow_declaration_order() {
        let registry = ModuleRegistry::erp();
        let keys = registry.active_module_keys();
        assert_eq!(keys.len(), 9);
        assert_eq!(keys[0], ModuleKey::Inventory);
        assert_eq!(keys[8], ModuleKey::Hr);
        assert!(!keys.contains(&ModuleKey::All));
    }

    #[test]
    fn test_select_columns_merge_dotted_paths_into_joins() {
        let descriptor = ModuleDescriptor::new(ModuleKey::Inventory, "Inventory", "Item", "inventory_items")
            .display(&["id", "name", "warehouses.code", "suppliers.name", "id"])
            .join(JoinSpec::new("warehouses", "warehouse_id", &["name"]));

        assert_eq!(
            descriptor.select_columns(),
            vec![
                "id".to_string(),
                "name".to_string(),
                "warehouses!warehouse_id(name,code)".to_string(),
                "suppliers(name)".to_string(),
            ]
        );
    }

    #[test]
    fn test_modules_watching_related_tables() {
        let registry = ModuleRegistry::erp();
        let watchers = registry.modules_watching("customers");
        assert_eq!(
            watchers,
            vec![ModuleKey::CustomerService, ModuleKey::Ecommerce, ModuleKey::Sales]
        );
        assert!(registry.modules_watching("audit_log").is_empty());
    }
}
