//! Equality filters applied to collection listings.

use crate::model::record::Record;
use serde_json::{Number, Value};

/// Conjunction of `field == value` predicates.
///
/// An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    predicates: Vec<(String, Value)>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one equality predicate.
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.predicates.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn predicates(&self) -> &[(String, Value)] {
        &self.predicates
    }

    /// Returns whether `record` satisfies every predicate.
    pub fn matches(&self, record: &Record) -> bool {
        self.predicates.iter().all(|(field, expected)| {
            record
                .lookup(field)
                .is_some_and(|actual| values_equal(actual.as_ref(), expected))
        })
    }

    /// Keeps matching records, preserving their relative order.
    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        if self.is_empty() {
            return records;
        }
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect()
    }
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(left), Value::Number(right)) => numbers_equal(left, right),
        _ => actual == expected,
    }
}

/// Integers compare exactly; floats fall back to `f64` so `10000 == 10000.0`.
fn numbers_equal(left: &Number, right: &Number) -> bool {
    if let (Some(left), Some(right)) = (left.as_i64(), right.as_i64()) {
        return left == right;
    }
    if let (Some(left), Some(right)) = (left.as_u64(), right.as_u64()) {
        return left == right;
    }
    if left.is_f64() || right.is_f64() {
        if let (Some(left), Some(right)) = (left.as_f64(), right.as_f64()) {
            return left == right;
        }
    }
    false
}
