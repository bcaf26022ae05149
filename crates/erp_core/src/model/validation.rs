//! Declarative field validation applied before any store mutation.
//!
//! # Responsibility
//! - Describe per-entity field rules once instead of per form.
//! - Report every violation of a submission in one pass.
//!
//! # Invariants
//! - Create submissions are checked against every rule.
//! - Update submissions are partial: only fields present in the patch are
//!   checked, but a present required field may not be blanked.
//! - Numeric rules accept JSON numbers and numeric strings (raw form input).

use crate::model::record::Fields;
use regex::Regex;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One rule attached to one field.
#[derive(Debug, Clone)]
pub enum FieldRule {
    /// Field must be present, non-null and not blank.
    Required,
    /// Field, when present, must be a number `> 0`.
    PositiveNumber,
    /// Field, when present, must be a number `>= 0`.
    NonNegativeNumber,
    /// Field, when present, must be a string matching the pattern.
    Pattern(Regex),
    /// Field, when present, must be one of the listed strings.
    OneOf(Vec<String>),
}

/// Whether a submission creates a record or patches an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    Create,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Missing,
    NotNumeric,
    NotPositive,
    Negative,
    PatternMismatch,
    NotAllowed,
}

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub kind: ViolationKind,
}

impl Display for FieldViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let field = self.field.as_str();
        match self.kind {
            ViolationKind::Missing => write!(f, "{field} is required"),
            ViolationKind::NotNumeric => write!(f, "{field} must be a number"),
            ViolationKind::NotPositive => write!(f, "{field} must be greater than zero"),
            ViolationKind::Negative => write!(f, "{field} cannot be negative"),
            ViolationKind::PatternMismatch => write!(f, "{field} has an invalid format"),
            ViolationKind::NotAllowed => write!(f, "{field} has an unsupported value"),
        }
    }
}

/// Validation failure carrying every violation found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub entity: String,
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Returns whether `field` failed with `kind`.
    pub fn has(&self, field: &str, kind: ViolationKind) -> bool {
        self.violations
            .iter()
            .any(|violation| violation.field == field && violation.kind == kind)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: ", self.entity)?;
        for (index, violation) in self.violations.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl Error for ValidationError {}

/// Rule set for one entity type.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    entity: String,
    rules: Vec<(String, FieldRule)>,
}

impl RecordSchema {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, field: impl Into<String>, rule: FieldRule) -> Self {
        self.rules.push((field.into(), rule));
        self
    }

    pub fn required(self, field: impl Into<String>) -> Self {
        self.rule(field, FieldRule::Required)
    }

    pub fn positive(self, field: impl Into<String>) -> Self {
        self.rule(field, FieldRule::PositiveNumber)
    }

    pub fn non_negative(self, field: impl Into<String>) -> Self {
        self.rule(field, FieldRule::NonNegativeNumber)
    }

    pub fn pattern(self, field: impl Into<String>, pattern: Regex) -> Self {
        self.rule(field, FieldRule::Pattern(pattern))
    }

    pub fn one_of(self, field: impl Into<String>, values: &[&str]) -> Self {
        let allowed = values.iter().map(|value| (*value).to_string()).collect();
        self.rule(field, FieldRule::OneOf(allowed))
    }

    pub fn entity(&self) -> &str {
        self.entity.as_str()
    }

    /// Checks `fields` and returns all violations, in rule order.
    pub fn validate(&self, fields: &Fields, mode: ValidationMode) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        for (field, rule) in &self.rules {
            let value = fields.get(field.as_str());
            if mode == ValidationMode::Update && value.is_none() {
                continue;
            }
            if let Some(kind) = check_rule(rule, value) {
                violations.push(FieldViolation {
                    field: field.clone(),
                    kind,
                });
            }
        }

        if violations.is_empty() {
            return Ok(());
        }
        Err(ValidationError {
            entity: self.entity.clone(),
            violations,
        })
    }
}

fn check_rule(rule: &FieldRule, value: Option<&Value>) -> Option<ViolationKind> {
    let value = match value {
        Some(value) if !is_blank(value) => value,
        _ => {
            return match rule {
                FieldRule::Required => Some(ViolationKind::Missing),
                _ => None,
            };
        }
    };

    match rule {
        FieldRule::Required => None,
        FieldRule::PositiveNumber => match as_number(value) {
            Some(number) if number > 0.0 => None,
            Some(_) => Some(ViolationKind::NotPositive),
            None => Some(ViolationKind::NotNumeric),
        },
        FieldRule::NonNegativeNumber => match as_number(value) {
            Some(number) if number >= 0.0 => None,
            Some(_) => Some(ViolationKind::Negative),
            None => Some(ViolationKind::NotNumeric),
        },
        FieldRule::Pattern(pattern) => match value.as_str() {
            Some(text) if pattern.is_match(text) => None,
            _ => Some(ViolationKind::PatternMismatch),
        },
        FieldRule::OneOf(allowed) => match value.as_str() {
            Some(text) if allowed.iter().any(|candidate| candidate == text) => None,
            _ => Some(ViolationKind::NotAllowed),
        },
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

/// Reads a JSON number or a numeric string as `f64`.
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}
