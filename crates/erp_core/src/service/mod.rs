//! Use-case services consumed by page components.
//!
//! # Responsibility
//! - Validate submissions before any store mutation.
//! - Convert repository failures into toasts plus safe fallback values.
//!
//! # Invariants
//! - Services never bypass repository persistence contracts.
//! - No failure escapes as a panic; every error path notifies the user.

pub mod entity_service;
