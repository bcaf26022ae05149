//! Validation schemas per entity type.
//!
//! Field names follow the camelCase keys stored by the front-end.
//! Cross-entity references (`warehouseId`, `vendorId`, `employeeId`) are
//! only required to be present; they are not resolved against their target
//! collection.

use crate::model::validation::RecordSchema;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));
static SKU_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("valid sku regex"));

pub fn warehouse() -> RecordSchema {
    RecordSchema::new("warehouse")
        .required("name")
        .positive("capacity")
}

pub fn inventory_item() -> RecordSchema {
    RecordSchema::new("item")
        .required("name")
        .required("sku")
        .pattern("sku", SKU_RE.clone())
        .non_negative("quantity")
        .non_negative("unitPrice")
        .non_negative("reorderLevel")
}

pub fn stock_movement() -> RecordSchema {
    RecordSchema::new("stock movement")
        .required("itemId")
        .required("warehouseId")
        .required("type")
        .one_of("type", &["in", "out", "transfer", "adjustment"])
        .positive("quantity")
}

pub fn stock_count() -> RecordSchema {
    RecordSchema::new("stock count")
        .required("itemId")
        .required("warehouseId")
        .non_negative("expectedQuantity")
        .required("countedQuantity")
        .non_negative("countedQuantity")
}

pub fn category() -> RecordSchema {
    RecordSchema::new("category").required("name")
}

pub fn vendor() -> RecordSchema {
    RecordSchema::new("vendor")
        .required("name")
        .pattern("email", EMAIL_RE.clone())
        .one_of("status", &["active", "inactive"])
}

pub fn requisition() -> RecordSchema {
    RecordSchema::new("requisition")
        .required("requestedBy")
        .required("itemName")
        .positive("quantity")
        .one_of("status", &["pending", "approved", "rejected"])
}

pub fn purchase_order() -> RecordSchema {
    RecordSchema::new("purchase order")
        .required("vendorId")
        .positive("totalAmount")
        .one_of(
            "status",
            &["draft", "pending", "approved", "received", "cancelled"],
        )
}

pub fn goods_receipt() -> RecordSchema {
    RecordSchema::new("goods receipt")
        .required("purchaseOrderId")
        .non_negative("receivedQuantity")
}

pub fn vendor_evaluation() -> RecordSchema {
    RecordSchema::new("vendor evaluation")
        .required("vendorId")
        .non_negative("qualityScore")
        .non_negative("deliveryScore")
        .non_negative("priceScore")
        .non_negative("serviceScore")
}

pub fn bill_of_materials() -> RecordSchema {
    RecordSchema::new("bill of materials")
        .required("productName")
        .positive("quantity")
}

pub fn work_order() -> RecordSchema {
    RecordSchema::new("work order")
        .required("productName")
        .positive("quantity")
        .one_of("status", &["planned", "in_progress", "completed", "cancelled"])
}

pub fn employee() -> RecordSchema {
    RecordSchema::new("employee")
        .required("firstName")
        .required("lastName")
        .required("email")
        .pattern("email", EMAIL_RE.clone())
        .non_negative("salary")
}

pub fn department() -> RecordSchema {
    RecordSchema::new("department").required("name")
}

pub fn performance_review() -> RecordSchema {
    RecordSchema::new("performance review")
        .required("employeeId")
        .required("reviewDate")
        .non_negative("rating")
}

pub fn asset() -> RecordSchema {
    RecordSchema::new("asset")
        .required("name")
        .positive("purchaseCost")
        .non_negative("salvageValue")
        .positive("usefulLifeYears")
}

pub fn time_entry() -> RecordSchema {
    RecordSchema::new("time entry").required("employeeId")
}

pub fn leave_request() -> RecordSchema {
    RecordSchema::new("leave request")
        .required("employeeId")
        .required("startDate")
        .required("endDate")
        .one_of("status", &["pending", "approved", "rejected"])
}
