//! Storage keys for locally persisted collections, grouped by domain.
//!
//! One key holds one JSON array. Keys are part of the persisted layout and
//! must not be renamed.

pub mod inventory {
    pub const ITEMS: &str = "erp_inventory_items";
    pub const WAREHOUSES: &str = "erp_inventory_warehouses";
    pub const STOCK_MOVEMENTS: &str = "erp_inventory_stock_movements";
    pub const STOCK_COUNTS: &str = "erp_inventory_stock_counts";
    pub const CATEGORIES: &str = "erp_inventory_categories";

    pub const ALL: &[&str] = &[ITEMS, WAREHOUSES, STOCK_MOVEMENTS, STOCK_COUNTS, CATEGORIES];
}

pub mod purchase {
    pub const VENDORS: &str = "erp_purchase_vendors";
    pub const REQUISITIONS: &str = "erp_purchase_requisitions";
    pub const PURCHASE_ORDERS: &str = "erp_purchase_orders";
    pub const GOODS_RECEIPTS: &str = "erp_purchase_goods_receipts";
    pub const VENDOR_EVALUATIONS: &str = "erp_purchase_vendor_evaluations";

    pub const ALL: &[&str] = &[
        VENDORS,
        REQUISITIONS,
        PURCHASE_ORDERS,
        GOODS_RECEIPTS,
        VENDOR_EVALUATIONS,
    ];
}

pub mod manufacturing {
    pub const BILLS_OF_MATERIALS: &str = "erp_manufacturing_boms";
    pub const WORK_ORDERS: &str = "erp_manufacturing_work_orders";

    pub const ALL: &[&str] = &[BILLS_OF_MATERIALS, WORK_ORDERS];
}

/// Every known key across domains.
pub fn all_keys() -> impl Iterator<Item = &'static str> {
    inventory::ALL
        .iter()
        .chain(purchase::ALL)
        .chain(manufacturing::ALL)
        .copied()
}

/// Returns whether `key` is one of the known collection keys.
pub fn is_known_key(key: &str) -> bool {
    all_keys().any(|known| known == key)
}
