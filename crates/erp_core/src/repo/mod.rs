//! Collection repositories: the CRUD contract shared by every entity type.
//!
//! # Responsibility
//! - Define one use-case oriented CRUD contract per collection.
//! - Provide the local (key-value storage) implementation; the REST variant
//!   lives in `remote`.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `CorruptCollection`)
//!   in addition to transport errors.
//! - Fail-soft behaviour is opt-in through `list_or_empty`.

pub mod collection_repo;
pub mod local_collection;
