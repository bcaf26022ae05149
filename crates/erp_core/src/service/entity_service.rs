//! Entity use-case service.
//!
//! # Responsibility
//! - Provide the UI-facing CRUD entry points for one entity type.
//! - Apply derived-field math and declarative validation on submit.
//! - Report every outcome on the toast channel.
//!
//! # Invariants
//! - A submission that fails validation is never written.
//! - Derived fields always reflect the stored inputs after an update.
//! - `list` never returns stale data: on failure it returns an empty list.
//! - Service layer remains storage-agnostic (local or REST).

use crate::domain::EntityProfile;
use crate::model::filter::RecordFilter;
use crate::model::record::{Fields, Record, RecordId};
use crate::model::validation::{RecordSchema, ValidationError, ValidationMode};
use crate::notify::ToastChannel;
use crate::repo::collection_repo::{CollectionRepository, RepoError, RepoResult};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Fills computed fields (totals, depreciation, ...) before validation.
pub type Derivation = Box<dyn Fn(&mut Fields)>;

#[derive(Debug)]
pub enum ServiceError {
    /// Submission rejected before reaching the store.
    Validation(ValidationError),
    /// Store or collaborator failure, including `NotFound`.
    Repo(RepoError),
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Repo(err) if err.is_not_found())
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// CRUD facade for one entity type over any collection repository.
pub struct EntityService<R: CollectionRepository> {
    repo: R,
    schema: RecordSchema,
    toasts: ToastChannel,
    derivation: Option<Derivation>,
}

impl<R: CollectionRepository> EntityService<R> {
    pub fn new(repo: R, schema: RecordSchema, toasts: ToastChannel) -> Self {
        Self {
            repo,
            schema,
            toasts,
            derivation: None,
        }
    }

    /// Builds a service with the schema and derivation of `profile`.
    pub fn from_profile(repo: R, profile: EntityProfile, toasts: ToastChannel) -> Self {
        let service = Self::new(repo, profile.schema, toasts);
        match profile.derivation {
            Some(derivation) => service.with_derivation(derivation),
            None => service,
        }
    }

    /// Attaches derived-field math run on every create/update submission.
    pub fn with_derivation(mut self, derivation: impl Fn(&mut Fields) + 'static) -> Self {
        self.derivation = Some(Box::new(derivation));
        self
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn toasts(&self) -> &ToastChannel {
        &self.toasts
    }

    /// Lists records; on failure shows an error toast and returns empty.
    pub fn list(&self, filter: &RecordFilter) -> Vec<Record> {
        match self.repo.list(filter) {
            Ok(records) => records,
            Err(err) => {
                error!(
                    "event=entity_list module=service status=error entity={} collection={} error={}",
                    self.entity(),
                    self.repo.name(),
                    err
                );
                self.toasts
                    .error(format!("Failed to load {} records", self.entity()));
                Vec::new()
            }
        }
    }

    /// Lists records without the fail-soft fallback.
    pub fn try_list(&self, filter: &RecordFilter) -> RepoResult<Vec<Record>> {
        self.repo.list(filter)
    }

    pub fn get(&self, id: &RecordId) -> ServiceResult<Option<Record>> {
        self.repo
            .get(id)
            .map_err(|err| self.report_failure("load", err))
    }

    /// Derives, validates, then persists a new record.
    pub fn create(&self, mut fields: Fields) -> ServiceResult<Record> {
        self.derive(&mut fields);
        self.check(&fields, ValidationMode::Create)?;

        let record = self
            .repo
            .create(fields)
            .map_err(|err| self.report_failure("create", err))?;
        info!(
            "event=entity_create module=service status=ok entity={} collection={}",
            self.entity(),
            self.repo.name()
        );
        self.toasts
            .success(format!("{} created successfully", capitalize(self.entity())));
        Ok(record)
    }

    /// Derives, validates, then merges `fields` into the record with `id`.
    ///
    /// With a derivation attached, the stored record is loaded first so that
    /// derived fields are recomputed from the merged view, not the patch alone.
    pub fn update(&self, id: &RecordId, mut fields: Fields) -> ServiceResult<Record> {
        if let Some(derivation) = &self.derivation {
            let current = self
                .repo
                .get(id)
                .and_then(|found| found.ok_or_else(|| RepoError::NotFound(id.clone())))
                .map_err(|err| self.report_failure("update", err))?;
            rederive_patch(derivation, &current.fields, &mut fields);
        }
        self.check(&fields, ValidationMode::Update)?;

        let record = self
            .repo
            .update(id, fields)
            .map_err(|err| self.report_failure("update", err))?;
        info!(
            "event=entity_update module=service status=ok entity={} collection={}",
            self.entity(),
            self.repo.name()
        );
        self.toasts
            .success(format!("{} updated successfully", capitalize(self.entity())));
        Ok(record)
    }

    pub fn delete(&self, id: &RecordId) -> ServiceResult<()> {
        self.repo
            .delete(id)
            .map_err(|err| self.report_failure("delete", err))?;
        info!(
            "event=entity_delete module=service status=ok entity={} collection={}",
            self.entity(),
            self.repo.name()
        );
        self.toasts
            .success(format!("{} deleted successfully", capitalize(self.entity())));
        Ok(())
    }

    fn entity(&self) -> &str {
        self.schema.entity()
    }

    fn derive(&self, fields: &mut Fields) {
        if let Some(derivation) = &self.derivation {
            derivation(fields);
        }
    }

    fn check(&self, fields: &Fields, mode: ValidationMode) -> ServiceResult<()> {
        self.schema.validate(fields, mode).map_err(|err| {
            warn!(
                "event=entity_validate module=service status=rejected entity={} violations={}",
                self.entity(),
                err.violations.len()
            );
            self.toasts.error(err.to_string());
            ServiceError::Validation(err)
        })
    }

    fn report_failure(&self, operation: &str, err: RepoError) -> ServiceError {
        if let RepoError::NotFound(id) = &err {
            warn!(
                "event=entity_{operation} module=service status=not_found entity={} collection={} id={id}",
                self.entity(),
                self.repo.name()
            );
            self.toasts
                .warning(format!("{} not found", capitalize(self.entity())));
        } else {
            error!(
                "event=entity_{operation} module=service status=error entity={} collection={} error={err}",
                self.entity(),
                self.repo.name()
            );
            self.toasts
                .error(format!("Failed to {operation} {}", self.entity()));
        }
        ServiceError::Repo(err)
    }
}

/// Runs `derivation` over `current` overlaid with `patch`, then copies every
/// field the merge changed back into `patch`.
fn rederive_patch(derivation: &Derivation, current: &Fields, patch: &mut Fields) {
    let mut merged = current.clone();
    merged.extend(patch.clone());
    derivation(&mut merged);
    for (key, value) in merged {
        if current.get(&key) != Some(&value) {
            patch.insert(key, value);
        }
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
