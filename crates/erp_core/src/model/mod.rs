//! Record model shared by every ERP collection.
//!
//! # Responsibility
//! - Define the flat record shape persisted in collections.
//! - Provide equality filters and declarative field validation.
//!
//! # Invariants
//! - Every record carries an `id` that never changes after creation.
//! - Records have no schema beyond the rules a caller attaches.

pub mod filter;
pub mod record;
pub mod validation;
