//! `CollectionRepository` over one REST resource.
//!
//! # Invariants
//! - Identity is assigned by the collaborator on `POST`.
//! - HTTP 404 on an id route maps to `RepoError::NotFound`.
//! - List filters are sent as query parameters and re-applied locally, so
//!   a collaborator that ignores them still yields a correct subset.

use super::client::{ApiClient, HttpMethod};
use super::RemoteError;
use crate::model::filter::RecordFilter;
use crate::model::record::{Fields, Record, RecordId};
use crate::repo::collection_repo::{CollectionRepository, RepoError, RepoResult};
use serde_json::Value;

/// REST resource such as `employees` or `time-entries`.
pub struct RestCollection<'c> {
    client: &'c ApiClient,
    resource: String,
}

impl<'c> RestCollection<'c> {
    pub fn new(client: &'c ApiClient, resource: impl Into<String>) -> Self {
        Self {
            client,
            resource: resource.into().trim_matches('/').to_string(),
        }
    }

    pub fn resource(&self) -> &str {
        self.resource.as_str()
    }

    /// `POST /{resource}/{action}`, e.g. `POST /time-entries/start`.
    pub fn post_action(&self, action: &str, body: &Value) -> RepoResult<Value> {
        let path = format!("{}/{}", self.resource, action.trim_matches('/'));
        Ok(self.client.send_json(HttpMethod::Post, &path, body)?)
    }

    /// `PATCH /{resource}/{id}/{action}`, e.g. `PATCH /assets/:id/assign`.
    pub fn patch_record_action(
        &self,
        id: &RecordId,
        action: &str,
        body: &Value,
    ) -> RepoResult<Value> {
        let path = format!("{}/{}", self.record_path(id), action.trim_matches('/'));
        self.client
            .send_json(HttpMethod::Patch, &path, body)
            .map_err(|err| not_found_or(err, id))
    }

    fn record_path(&self, id: &RecordId) -> String {
        format!("{}/{}", self.resource, id)
    }
}

impl CollectionRepository for RestCollection<'_> {
    fn name(&self) -> &str {
        self.resource.as_str()
    }

    fn list(&self, filter: &RecordFilter) -> RepoResult<Vec<Record>> {
        let query = filter
            .predicates()
            .iter()
            .map(|(field, value)| (field.clone(), query_value(value)))
            .collect::<Vec<_>>();
        let body = self.client.get_json(&self.resource, &query)?;
        Ok(filter.apply(decode_records(body)?))
    }

    fn get(&self, id: &RecordId) -> RepoResult<Option<Record>> {
        match self.client.get_json(&self.record_path(id), &[]) {
            Ok(body) => decode_record(body).map(Some),
            Err(RemoteError::Status { code: 404, .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn create(&self, fields: Fields) -> RepoResult<Record> {
        let body = self
            .client
            .send_json(HttpMethod::Post, &self.resource, &Value::Object(fields))?;
        decode_record(body)
    }

    fn update(&self, id: &RecordId, fields: Fields) -> RepoResult<Record> {
        let body = self
            .client
            .send_json(HttpMethod::Put, &self.record_path(id), &Value::Object(fields))
            .map_err(|err| not_found_or(err, id))?;
        decode_record(body)
    }

    fn delete(&self, id: &RecordId) -> RepoResult<()> {
        self.client
            .delete(&self.record_path(id))
            .map_err(|err| not_found_or(err, id))
    }
}

fn not_found_or(err: RemoteError, id: &RecordId) -> RepoError {
    match err {
        RemoteError::Status { code: 404, .. } => RepoError::NotFound(id.clone()),
        other => RepoError::Remote(other),
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Accepts a bare array or an envelope `{ "data": [...] }`.
fn decode_records(body: Value) -> RepoResult<Vec<Record>> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(RepoError::InvalidData(
                    "list response is neither an array nor a `data` array envelope".to_string(),
                ))
            }
        },
        Value::Null => Vec::new(),
        other => {
            return Err(RepoError::InvalidData(format!(
                "unexpected list response: {other}"
            )))
        }
    };

    items
        .into_iter()
        .map(|item| {
            serde_json::from_value::<Record>(item)
                .map_err(|err| RepoError::InvalidData(err.to_string()))
        })
        .collect()
}

/// Accepts a record object or an envelope `{ "data": {...} }`.
fn decode_record(body: Value) -> RepoResult<Record> {
    let body = match body {
        Value::Object(mut envelope) if !envelope.contains_key("id") => {
            match envelope.remove("data") {
                Some(inner @ Value::Object(_)) => inner,
                _ => {
                    return Err(RepoError::InvalidData(
                        "record response has no `id`".to_string(),
                    ))
                }
            }
        }
        other => other,
    };
    serde_json::from_value::<Record>(body).map_err(|err| RepoError::InvalidData(err.to_string()))
}
