//! Derived-field math computed on submit.
//!
//! # Invariants
//! - Derivations only write when every input they need is present and
//!   numeric; partial update patches pass through untouched.
//! - Money and percentage outputs are rounded to two decimals.

use crate::model::record::Fields;
use crate::model::validation::as_number;
use serde_json::{Number, Value};

const EVALUATION_CRITERIA: [&str; 4] = [
    "qualityScore",
    "deliveryScore",
    "priceScore",
    "serviceScore",
];

/// Straight-line depreciation of one asset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Depreciation {
    pub annual: f64,
    pub accumulated: f64,
    pub book_value: f64,
}

/// Straight-line depreciation after `elapsed_years`.
///
/// Accumulated depreciation never exceeds the depreciable base, so the book
/// value bottoms out at the salvage value. A non-positive life yields no
/// depreciation.
pub fn straight_line_depreciation(
    cost: f64,
    salvage: f64,
    useful_life_years: f64,
    elapsed_years: f64,
) -> Depreciation {
    let base = (cost - salvage).max(0.0);
    if useful_life_years <= 0.0 {
        return Depreciation {
            annual: 0.0,
            accumulated: 0.0,
            book_value: cost,
        };
    }

    let annual = base / useful_life_years;
    let accumulated = (annual * elapsed_years.max(0.0)).min(base);
    Depreciation {
        annual,
        accumulated,
        book_value: cost - accumulated,
    }
}

/// Difference between counted and expected stock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockVariance {
    pub quantity: f64,
    /// `None` when nothing was expected.
    pub percent: Option<f64>,
}

pub fn stock_variance(expected: f64, counted: f64) -> StockVariance {
    let quantity = counted - expected;
    let percent = (expected != 0.0).then(|| quantity * 100.0 / expected);
    StockVariance { quantity, percent }
}

/// Mean of the numeric entries; `None` when there are none.
pub fn score_average<'a>(values: impl IntoIterator<Item = &'a Value>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .filter_map(as_number)
        .fold((0.0, 0_u32), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Fills `annualDepreciation`, `accumulatedDepreciation` and `bookValue`
/// from `purchaseCost`, `salvageValue`, `usefulLifeYears`, `yearsInService`.
pub fn derive_asset_depreciation(fields: &mut Fields) {
    let (Some(cost), Some(life)) = (
        number(fields, "purchaseCost"),
        number(fields, "usefulLifeYears"),
    ) else {
        return;
    };
    let salvage = number(fields, "salvageValue").unwrap_or(0.0);
    let elapsed = number(fields, "yearsInService").unwrap_or(0.0);

    let depreciation = straight_line_depreciation(cost, salvage, life, elapsed);
    set_number(fields, "annualDepreciation", round2(depreciation.annual));
    set_number(fields, "accumulatedDepreciation", round2(depreciation.accumulated));
    set_number(fields, "bookValue", round2(depreciation.book_value));
}

/// Fills `variance` and `variancePercent` from `expectedQuantity` and
/// `countedQuantity`.
pub fn derive_stock_variance(fields: &mut Fields) {
    let (Some(expected), Some(counted)) = (
        number(fields, "expectedQuantity"),
        number(fields, "countedQuantity"),
    ) else {
        return;
    };

    let variance = stock_variance(expected, counted);
    set_number(fields, "variance", variance.quantity);
    match variance.percent {
        Some(percent) => set_number(fields, "variancePercent", round2(percent)),
        None => {
            fields.insert("variancePercent".to_string(), Value::Null);
        }
    }
}

/// Fills `overallScore` with the mean of the evaluation criteria present.
pub fn derive_evaluation_score(fields: &mut Fields) {
    let scores = EVALUATION_CRITERIA
        .iter()
        .filter_map(|key| fields.get(*key))
        .collect::<Vec<_>>();
    if let Some(average) = score_average(scores) {
        set_number(fields, "overallScore", round2(average));
    }
}

/// Fills `totalAmount` from an `items` array of `{ quantity, unitPrice }`.
///
/// Lines with non-numeric quantity or price count as zero.
pub fn derive_order_total(fields: &mut Fields) {
    let Some(Value::Array(items)) = fields.get("items") else {
        return;
    };

    let total = items
        .iter()
        .map(|item| {
            let quantity = item.get("quantity").and_then(as_number).unwrap_or(0.0);
            let unit_price = item.get("unitPrice").and_then(as_number).unwrap_or(0.0);
            quantity * unit_price
        })
        .sum::<f64>();
    set_number(fields, "totalAmount", round2(total));
}

fn number(fields: &Fields, key: &str) -> Option<f64> {
    fields.get(key).and_then(as_number)
}

fn set_number(fields: &mut Fields, key: &str, value: f64) {
    let value = Number::from_f64(value).map_or(Value::Null, Value::Number);
    fields.insert(key.to_string(), value);
}
