//! ERP entity definitions built on the generic record store.
//!
//! # Responsibility
//! - Declare validation schemas for inventory, purchase, manufacturing and
//!   HR entities.
//! - Provide the derived-field math computed synchronously on submit.
//! - Map storage keys to the schema and derivation of the entity they hold.

use crate::model::record::Fields;
use crate::model::validation::RecordSchema;
use crate::remote::resources;
use crate::storage::keys::{inventory, manufacturing, purchase};

pub mod derived;
pub mod schemas;

/// Validation and derived-field rules for one entity type.
pub struct EntityProfile {
    pub schema: RecordSchema,
    pub derivation: Option<fn(&mut Fields)>,
}

impl EntityProfile {
    fn plain(schema: RecordSchema) -> Self {
        Self {
            schema,
            derivation: None,
        }
    }

    fn derived(schema: RecordSchema, derivation: fn(&mut Fields)) -> Self {
        Self {
            schema,
            derivation: Some(derivation),
        }
    }
}

/// Returns the profile of the entity stored under `key`, if the key is known.
pub fn profile_for_key(key: &str) -> Option<EntityProfile> {
    let profile = match key {
        inventory::ITEMS => EntityProfile::plain(schemas::inventory_item()),
        inventory::WAREHOUSES => EntityProfile::plain(schemas::warehouse()),
        inventory::STOCK_MOVEMENTS => EntityProfile::plain(schemas::stock_movement()),
        inventory::STOCK_COUNTS => {
            EntityProfile::derived(schemas::stock_count(), derived::derive_stock_variance)
        }
        inventory::CATEGORIES => EntityProfile::plain(schemas::category()),
        purchase::VENDORS => EntityProfile::plain(schemas::vendor()),
        purchase::REQUISITIONS => EntityProfile::plain(schemas::requisition()),
        purchase::PURCHASE_ORDERS => {
            EntityProfile::derived(schemas::purchase_order(), derived::derive_order_total)
        }
        purchase::GOODS_RECEIPTS => EntityProfile::plain(schemas::goods_receipt()),
        purchase::VENDOR_EVALUATIONS => EntityProfile::derived(
            schemas::vendor_evaluation(),
            derived::derive_evaluation_score,
        ),
        manufacturing::BILLS_OF_MATERIALS => EntityProfile::plain(schemas::bill_of_materials()),
        manufacturing::WORK_ORDERS => EntityProfile::plain(schemas::work_order()),
        _ => return None,
    };
    Some(profile)
}

/// Returns the profile of the entity served by the REST `resource`.
pub fn profile_for_resource(resource: &str) -> Option<EntityProfile> {
    let profile = match resource {
        resources::EMPLOYEES => EntityProfile::plain(schemas::employee()),
        resources::DEPARTMENTS => EntityProfile::plain(schemas::department()),
        resources::TIME_ENTRIES => EntityProfile::plain(schemas::time_entry()),
        resources::LEAVE_REQUESTS => EntityProfile::plain(schemas::leave_request()),
        resources::PERFORMANCE_REVIEWS => EntityProfile::plain(schemas::performance_review()),
        resources::ASSETS => {
            EntityProfile::derived(schemas::asset(), derived::derive_asset_depreciation)
        }
        _ => return None,
    };
    Some(profile)
}
