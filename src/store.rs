//! The resource store contract shared by the HTTP surface and the
//! synchronizer.

use std::future::Future;

use crate::models::{Document, DocumentError, EntityKind, Fields};

/// Per-kind persistence for documents.
///
/// Every operation is atomic with respect to a single document. Writes to the
/// same document are linearizable; writes to different documents are
/// independent.
pub trait ResourceStore: Clone + Send + Sync + 'static {
    /// The entity kind this store holds.
    fn kind(&self) -> EntityKind;

    /// Returns every document of the kind.
    fn list_all(&self) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Inserts a new document. The identifier comes from `id`, then `_id`,
    /// and is generated when neither is present.
    fn create(&self, fields: Fields) -> impl Future<Output = Result<Document, StoreError>> + Send;

    /// Merges `patch` into an existing document.
    fn update(
        &self,
        id: &str,
        patch: Fields,
    ) -> impl Future<Output = Result<Document, StoreError>> + Send;

    /// Removes a document.
    fn delete(&self, id: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Inserts the record if its identifier is unknown, otherwise merges the
    /// supplied fields into the existing document.
    fn upsert(&self, fields: Fields) -> impl Future<Output = Result<Document, StoreError>> + Send;
}

/// Errors that can occur in store operations.
#[derive(Debug)]
pub enum StoreError {
    /// No document with this identifier.
    NotFound { kind: EntityKind, id: String },
    /// A document with this identifier already exists.
    DuplicateKey { kind: EntityKind, id: String },
    /// The input could not be normalized into a document.
    InvalidDocument(DocumentError),
    /// A stored body could not be read back as a field map.
    Corrupt {
        kind: EntityKind,
        id: String,
        reason: String,
    },
    /// Fields could not be encoded for storage.
    Encode(serde_json::Error),
    /// Underlying database failure.
    Database(sqlx::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound { kind, id } => write!(f, "No {} with id '{}'", kind, id),
            StoreError::DuplicateKey { kind, id } => {
                write!(f, "A {} with id '{}' already exists", kind, id)
            }
            StoreError::InvalidDocument(e) => write!(f, "Invalid document: {}", e),
            StoreError::Corrupt { kind, id, reason } => {
                write!(f, "Stored {} '{}' is unreadable: {}", kind, id, reason)
            }
            StoreError::Encode(e) => write!(f, "Failed to encode document: {}", e),
            StoreError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::InvalidDocument(e) => Some(e),
            StoreError::Encode(e) => Some(e),
            StoreError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DocumentError> for StoreError {
    fn from(e: DocumentError) -> Self {
        StoreError::InvalidDocument(e)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e)
    }
}
