//! The ERP module catalog the dashboard ships with.

use super::types::{JoinSpec, ModuleDescriptor, ModuleKey};

/// Descriptors in declaration order. The activity feed relies on this order
/// for its tie-breaks, so new modules go at the end (before `all`).
pub fn erp_descriptors() -> Vec<ModuleDescriptor> {
    vec![
        ModuleDescriptor::new(ModuleKey::Inventory, "Inventory", "Inventory Item", "inventory_items")
            .related(&["inventory_transactions", "warehouses"])
            .display(&[
                "id",
                "sku",
                "name",
                "quantity",
                "unit_price",
                "reorder_level",
                "status",
                "created_at",
            ])
            .aggregate(&["quantity", "unit_price"])
            .join(JoinSpec::new("warehouses", "warehouse_id", &["name", "location"])),
        ModuleDescriptor::new(
            ModuleKey::CustomerService,
            "Customer Service",
            "Support Ticket",
            "support_tickets",
        )
        .related(&["ticket_responses", "customers"])
        .display(&[
            "id",
            "ticket_number",
            "subject",
            "priority",
            "status",
            "satisfaction_rating",
            "created_at",
            "customers.name",
        ])
        .aggregate(&["satisfaction_rating"]),
        ModuleDescriptor::new(ModuleKey::Procurement, "Procurement", "Purchase Order", "purchase_orders")
            .related(&["purchase_order_items", "suppliers"])
            .display(&["id", "po_number", "total_amount", "status", "order_date", "expected_date"])
            .aggregate(&["total_amount"])
            .join(JoinSpec::new("suppliers", "supplier_id", &["name", "contact_email"])),
        ModuleDescriptor::new(ModuleKey::SupplyChain, "Supply Chain", "Shipment", "shipments")
            .related(&["shipment_items", "carriers"])
            .display(&[
                "id",
                "tracking_number",
                "origin",
                "destination",
                "status",
                "shipping_cost",
                "estimated_delivery",
                "carriers.name",
            ])
            .aggregate(&["shipping_cost"]),
        ModuleDescriptor::new(ModuleKey::Finance, "Finance", "Transaction", "transactions")
            .related(&["accounts", "invoices"])
            .display(&["id", "transaction_type", "amount", "description", "transaction_date"])
            .aggregate(&["amount"])
            .join(JoinSpec::new("accounts", "account_id", &["account_name", "account_type"])),
        ModuleDescriptor::new(ModuleKey::Ecommerce, "E-commerce", "Online Order", "orders")
            .related(&["order_items", "products", "customers"])
            .display(&["id", "order_number", "total_amount", "status", "payment_status", "order_date"])
            .aggregate(&["total_amount"])
            .join(JoinSpec::new("customers", "customer_id", &["name", "email"])),
        ModuleDescriptor::new(ModuleKey::Sales, "Sales", "Sales Order", "sales_orders")
            .related(&["sales_order_items", "customers", "leads"])
            .display(&[
                "id",
                "order_number",
                "total_amount",
                "discount",
                "status",
                "order_date",
                "customers.name",
            ])
            .aggregate(&["total_amount", "discount"]),
        ModuleDescriptor::new(
            ModuleKey::ProjectManagement,
            "Project Management",
            "Project",
            "projects",
        )
        .related(&["project_tasks", "project_members"])
        .display(&["id", "name", "status", "budget", "progress", "start_date", "end_date"])
        .aggregate(&["budget", "progress"]),
        ModuleDescriptor::new(ModuleKey::Hr, "Human Resources", "Employee", "employees")
            .related(&["departments", "payroll", "attendance"])
            .display(&[
                "id",
                "first_name",
                "last_name",
                "position",
                "salary",
                "status",
                "hire_date",
            ])
            .aggregate(&["salary"])
            .join(JoinSpec::new("departments", "department_id", &["name"])),
        ModuleDescriptor::new(ModuleKey::All, "All Modules", "Record", ""),
    ]
}
