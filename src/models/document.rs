//! Canonical document shape shared by every entity kind.
//!
//! A stored record keeps its identity under `_id`; the public projection
//! exposes the same value as `id`. Everything else in a record is an open
//! field map that is carried verbatim, including `translations`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use super::kind::{Entity, EntityKind};

/// Open field map of a document. Never contains the identity keys.
pub type Fields = Map<String, Value>;

/// Locale code to a partial override of display fields.
pub type Translations = BTreeMap<String, Fields>;

/// Public identity key.
pub const ID_KEY: &str = "id";
/// Internal (storage) identity key, also accepted on input for legacy records.
pub const STORAGE_ID_KEY: &str = "_id";

/// A document in its public shape: `{"id": ..., <fields>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, mut fields: Fields) -> Self {
        strip_identity(&mut fields);
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Returns the stored shape, with identity under `_id`.
    pub fn into_stored(self) -> Fields {
        let mut stored = self.fields;
        stored.insert(STORAGE_ID_KEY.to_string(), Value::String(self.id));
        stored
    }

    /// Decodes the fields into the typed record of an entity kind.
    pub fn decode<E: Entity>(&self) -> Result<E, serde_json::Error> {
        serde_json::from_value(Value::Object(self.fields.clone()))
    }
}

/// Errors raised while normalizing a raw record into a document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The record is not a JSON object.
    NotAnObject(&'static str),
    /// An identity key holds a value that cannot be an identifier.
    InvalidId { key: &'static str, found: &'static str },
    /// A stored record has no `_id`.
    MissingId,
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::NotAnObject(found) => {
                write!(f, "Expected a JSON object, found {}", found)
            }
            DocumentError::InvalidId { key, found } => {
                write!(f, "Field '{}' must be a string or an integer, found {}", key, found)
            }
            DocumentError::MissingId => write!(f, "Stored record has no '{}'", STORAGE_ID_KEY),
        }
    }
}

impl std::error::Error for DocumentError {}

/// Generates a fresh collision-resistant identifier.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Unwraps a raw JSON value into a field map.
pub fn into_fields(value: Value) -> Result<Fields, DocumentError> {
    match value {
        Value::Object(fields) => Ok(fields),
        other => Err(DocumentError::NotAnObject(json_type_name(&other))),
    }
}

/// Identifier derived from a record's content, stable across runs.
///
/// Keys are serialized in sorted order, so two records with the same fields
/// always map to the same identifier within a kind.
pub fn content_id(kind: EntityKind, fields: &Fields) -> String {
    let name = format!("{}/{}", kind.name(), Value::Object(fields.clone()));
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
        .simple()
        .to_string()
}

/// Removes the identity keys from `fields` and returns the identifier to use.
///
/// `id` wins over `_id`; a fresh identifier is generated when neither
/// carries a value. `null` and empty strings count as absent.
pub fn resolve_id(fields: &mut Fields) -> Result<String, DocumentError> {
    Ok(take_identity(fields)?.unwrap_or_else(generate_id))
}

/// Like [`resolve_id`], but a record without an identifier gets its
/// [`content_id`] so that loading it again finds the same document.
pub fn resolve_content_id(kind: EntityKind, fields: &mut Fields) -> Result<String, DocumentError> {
    match take_identity(fields)? {
        Some(id) => Ok(id),
        None => Ok(content_id(kind, fields)),
    }
}

/// Projects a stored record into its public shape by renaming `_id` to `id`.
pub fn to_public(mut stored: Fields) -> Result<Document, DocumentError> {
    let id = take_id(&mut stored, STORAGE_ID_KEY)?.ok_or(DocumentError::MissingId)?;
    Ok(Document::new(id, stored))
}

/// Shallow merge: every supplied top-level key replaces the stored value.
/// Identity keys in the patch are ignored.
pub fn merge_fields(target: &mut Fields, patch: &Fields) {
    for (key, value) in patch {
        if is_identity_key(key) {
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}

/// Reads the identifier a raw record asks for, without modifying it.
pub fn requested_id(record: &Value) -> Option<String> {
    [ID_KEY, STORAGE_ID_KEY]
        .iter()
        .filter_map(|key| record.get(*key))
        .find_map(id_string)
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn is_identity_key(key: &str) -> bool {
    key == ID_KEY || key == STORAGE_ID_KEY
}

fn strip_identity(fields: &mut Fields) {
    fields.remove(ID_KEY);
    fields.remove(STORAGE_ID_KEY);
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}

fn take_identity(fields: &mut Fields) -> Result<Option<String>, DocumentError> {
    match take_id(fields, ID_KEY)? {
        Some(id) => {
            fields.remove(STORAGE_ID_KEY);
            Ok(Some(id))
        }
        None => take_id(fields, STORAGE_ID_KEY),
    }
}

fn take_id(fields: &mut Fields, key: &'static str) -> Result<Option<String>, DocumentError> {
    match fields.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => match id_string(&value) {
            Some(id) => Ok(Some(id)),
            None if value.as_str() == Some("") => Ok(None),
            None => Err(DocumentError::InvalidId {
                key,
                found: json_type_name(&value),
            }),
        },
    }
}
