//! REST-backed collections.
//!
//! # Responsibility
//! - Talk to the ERP REST collaborator (`GET /employees`,
//!   `POST /time-entries/start`, `PATCH /assets/:id/assign`, ...).
//! - Expose the same `CollectionRepository` contract as local collections.
//!
//! # Invariants
//! - Any non-2xx status is a failure; bodies are JSON arrays or objects.
//! - Every request carries connect/read timeouts from `ApiConfig`.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod client;
mod rest_collection;

pub use client::{ApiClient, HttpMethod};
pub use rest_collection::RestCollection;

/// Resource paths served by the REST collaborator.
pub mod resources {
    pub const EMPLOYEES: &str = "employees";
    pub const DEPARTMENTS: &str = "departments";
    pub const TIME_ENTRIES: &str = "time-entries";
    pub const LEAVE_REQUESTS: &str = "leave-requests";
    pub const PERFORMANCE_REVIEWS: &str = "performance-reviews";
    pub const ASSETS: &str = "assets";

    pub const ALL: [&str; 6] = [
        EMPLOYEES,
        DEPARTMENTS,
        TIME_ENTRIES,
        LEAVE_REQUESTS,
        PERFORMANCE_REVIEWS,
        ASSETS,
    ];
}

pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Collaborator answered with a non-2xx status.
    Status { code: u16, body: String },
    /// Connection, DNS, TLS or timeout failure.
    Transport(String),
    /// Response body was not the expected JSON shape.
    Decode(String),
}

impl RemoteError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { code, body } if body.is_empty() => {
                write!(f, "api request failed with http status {code}")
            }
            Self::Status { code, body } => {
                write!(f, "api request failed with http status {code}: {body}")
            }
            Self::Transport(message) => write!(f, "api transport error: {message}"),
            Self::Decode(message) => write!(f, "api response decode error: {message}"),
        }
    }
}

impl Error for RemoteError {}
