//! Record domain model.
//!
//! # Responsibility
//! - Define the canonical flat record stored in every collection.
//! - Own identity and timestamp assignment for create/update.
//!
//! # Invariants
//! - `id` is non-empty and stable for the record lifetime, JSON type included.
//! - Caller-supplied `id`/`createdAt`/`updatedAt` keys never override the
//!   values managed here.
//! - Serialized form is one flat JSON object: `{ id, createdAt?, updatedAt?, ...fields }`.

use crate::clock::iso8601;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

/// Field name → JSON value, as entered by a form or returned by the API.
pub type Fields = Map<String, Value>;

pub const ID_KEY: &str = "id";
pub const CREATED_AT_KEY: &str = "createdAt";
pub const UPDATED_AT_KEY: &str = "updatedAt";

const RESERVED_KEYS: [&str; 3] = [ID_KEY, CREATED_AT_KEY, UPDATED_AT_KEY];

/// Identifier of one record inside its collection.
///
/// Generated ids are UUID v4 strings. Ids coming from storage or the REST
/// collaborator may be JSON strings or integers (legacy `Date.now()` ids).
/// An integer id is written back as an integer, so a record keeps the exact
/// id it was read with. Equality and hashing use the textual form only.
#[derive(Debug, Clone)]
pub struct RecordId {
    text: String,
    integer: bool,
}

impl RecordId {
    /// Generates a fresh unique identifier.
    pub fn generate() -> Self {
        Self {
            text: Uuid::new_v4().to_string(),
            integer: false,
        }
    }

    /// Wraps an existing identifier. Returns `None` for blank input.
    pub fn parse(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            text: trimmed.to_string(),
            integer: false,
        })
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    /// Returns whether the id was stored as a JSON integer.
    pub fn is_integer(&self) -> bool {
        self.integer
    }

    /// The id in the JSON form it is persisted with.
    pub fn to_value(&self) -> Value {
        if self.integer {
            if let Ok(value) = self.text.parse::<i64>() {
                return Value::from(value);
            }
            if let Ok(value) = self.text.parse::<u64>() {
                return Value::from(value);
            }
        }
        Value::String(self.text.clone())
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self {
            text: value.to_string(),
            integer: true,
        }
    }
}

impl PartialEq for RecordId {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for RecordId {}

impl Hash for RecordId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        let (text, integer) = match RawId::deserialize(deserializer)? {
            RawId::Text(value) => (value, false),
            RawId::Signed(value) => (value.to_string(), true),
            RawId::Unsigned(value) => (value.to_string(), true),
        };
        let mut id =
            RecordId::parse(text).ok_or_else(|| de::Error::custom("record id cannot be empty"))?;
        id.integer = integer;
        Ok(id)
    }
}

/// One domain entity (employee, asset, vendor, ...) in a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(
        rename = "createdAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
    #[serde(
        rename = "updatedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Record {
    /// Creates a record with a fresh id and a `createdAt` stamp.
    pub fn new(fields: Fields, now_ms: i64) -> Self {
        Self::with_id(RecordId::generate(), fields, now_ms)
    }

    /// Creates a record with a caller-provided id.
    ///
    /// Used by import paths and by the REST variant, where identity is
    /// assigned by the collaborator.
    pub fn with_id(id: RecordId, fields: Fields, now_ms: i64) -> Self {
        Self {
            id,
            created_at: Some(iso8601(now_ms)),
            updated_at: None,
            fields: strip_reserved(fields),
        }
    }

    /// Merges `patch` over the current fields and stamps `updatedAt`.
    ///
    /// Fields absent from `patch` are left untouched.
    pub fn apply(&mut self, patch: Fields, now_ms: i64) {
        for (key, value) in strip_reserved(patch) {
            self.fields.insert(key, value);
        }
        self.updated_at = Some(iso8601(now_ms));
    }

    /// Returns the value of a plain (non-reserved) field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Looks up any addressable key, reserved keys included.
    pub fn lookup(&self, name: &str) -> Option<Cow<'_, Value>> {
        match name {
            ID_KEY => Some(Cow::Owned(self.id.to_value())),
            CREATED_AT_KEY => self
                .created_at
                .as_ref()
                .map(|value| Cow::Owned(Value::String(value.clone()))),
            UPDATED_AT_KEY => self
                .updated_at
                .as_ref()
                .map(|value| Cow::Owned(Value::String(value.clone()))),
            other => self.fields.get(other).map(Cow::Borrowed),
        }
    }
}

/// Returns whether `key` is managed by the store rather than the caller.
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// Converts a JSON object into `Fields`. Returns `None` for non-objects.
pub fn fields_from_value(value: Value) -> Option<Fields> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn strip_reserved(mut fields: Fields) -> Fields {
    for key in RESERVED_KEYS {
        fields.remove(key);
    }
    fields
}
