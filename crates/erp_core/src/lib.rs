//! Core record store for the ERP front-end.
//! Collections of flat JSON records over key-value storage or a REST
//! collaborator, plus the toast channel that reports operation outcomes.

pub mod clock;
pub mod config;
pub mod db;
pub mod domain;
pub mod logging;
pub mod model;
pub mod notify;
pub mod remote;
pub mod repo;
pub mod service;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ApiConfig, ConfigError, ErpConfig, LoggingConfig, StorageConfig, ToastConfig};
pub use domain::{profile_for_key, profile_for_resource, EntityProfile};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::filter::RecordFilter;
pub use model::record::{fields_from_value, Fields, Record, RecordId};
pub use model::validation::{
    FieldRule, FieldViolation, RecordSchema, ValidationError, ValidationMode, ViolationKind,
};
pub use notify::{RetractReason, Toast, ToastChannel, ToastEvent, ToastHandle, ToastKind};
pub use remote::{ApiClient, RemoteError, RestCollection};
pub use repo::collection_repo::{CollectionRepository, RepoError, RepoResult};
pub use repo::local_collection::LocalCollection;
pub use service::entity_service::{EntityService, ServiceError, ServiceResult};
pub use storage::{KeyValueStorage, MemoryStorage, SqliteStorage, StorageError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
