use serde_json::Value;
use sqlx::SqlitePool;

use crate::models::document::{self, json_type_name};
use crate::models::{Document, EntityKind, Fields};
use crate::store::{ResourceStore, StoreError};

/// SQLite-backed collection of one entity kind.
///
/// Bodies are stored as JSON text in their stored shape (identity under
/// `_id`) next to a version counter. Merges read the body, apply the patch
/// and write back only if the version is unchanged, retrying otherwise, so
/// concurrent writers to one document never lose updates.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
    kind: EntityKind,
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    body: String,
}

#[derive(sqlx::FromRow)]
struct VersionedBody {
    body: String,
    version: i64,
}

impl DocumentRepository {
    pub fn new(pool: SqlitePool, kind: EntityKind) -> Self {
        Self { pool, kind }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub async fn list(&self) -> Result<Vec<Document>, StoreError> {
        let rows: Vec<DocumentRow> =
            sqlx::query_as("SELECT id, body FROM documents WHERE kind = ? ORDER BY rowid")
                .bind(self.kind.name())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|row| {
                let stored = self.parse_body(&row.id, &row.body)?;
                self.project(&row.id, stored)
            })
            .collect()
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Document>, StoreError> {
        match self.fetch(id).await? {
            Some((stored, _)) => self.project(id, stored).map(Some),
            None => Ok(None),
        }
    }

    pub async fn insert(&self, mut fields: Fields) -> Result<Document, StoreError> {
        let id = document::resolve_id(&mut fields)?;
        self.insert_document(Document::new(id, fields)).await
    }

    pub async fn merge(&self, id: &str, patch: &Fields) -> Result<Document, StoreError> {
        self.try_merge(id, patch)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                kind: self.kind,
                id: id.to_string(),
            })
    }

    pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE kind = ? AND id = ?")
            .bind(self.kind.name())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                kind: self.kind,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub async fn insert_or_merge(&self, mut fields: Fields) -> Result<Document, StoreError> {
        let id = document::resolve_id(&mut fields)?;

        loop {
            if let Some(merged) = self.try_merge(&id, &fields).await? {
                return Ok(merged);
            }
            match self
                .insert_document(Document::new(id.clone(), fields.clone()))
                .await
            {
                Ok(inserted) => return Ok(inserted),
                // Lost an insert race; the document exists now, merge into it
                Err(StoreError::DuplicateKey { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Returns the stored shape of a document with its version.
    async fn fetch(&self, id: &str) -> Result<Option<(Fields, i64)>, StoreError> {
        let row: Option<VersionedBody> =
            sqlx::query_as("SELECT body, version FROM documents WHERE kind = ? AND id = ?")
                .bind(self.kind.name())
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => Ok(Some((self.parse_body(id, &row.body)?, row.version))),
            None => Ok(None),
        }
    }

    async fn insert_document(&self, document: Document) -> Result<Document, StoreError> {
        let id = document.id.clone();
        let stored = document.into_stored();
        let body = serde_json::to_string(&stored).map_err(StoreError::Encode)?;

        let result = sqlx::query(
            "INSERT INTO documents (kind, id, body, version) VALUES (?, ?, ?, 0)",
        )
        .bind(self.kind.name())
        .bind(&id)
        .bind(&body)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => self.project(&id, stored),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateKey {
                    kind: self.kind,
                    id,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns `None` when the document does not exist.
    async fn try_merge(&self, id: &str, patch: &Fields) -> Result<Option<Document>, StoreError> {
        loop {
            let Some((mut stored, version)) = self.fetch(id).await? else {
                return Ok(None);
            };

            document::merge_fields(&mut stored, patch);
            let body = serde_json::to_string(&stored).map_err(StoreError::Encode)?;

            let result = sqlx::query(
                "UPDATE documents SET body = ?, version = version + 1 WHERE kind = ? AND id = ? AND version = ?",
            )
            .bind(&body)
            .bind(self.kind.name())
            .bind(id)
            .bind(version)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 1 {
                return self.project(id, stored).map(Some);
            }
            tracing::debug!(kind = %self.kind, id, "Concurrent write detected, retrying merge");
        }
    }

    fn parse_body(&self, id: &str, body: &str) -> Result<Fields, StoreError> {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(stored)) => Ok(stored),
            Ok(other) => Err(self.corrupt(
                id,
                format!("expected an object, found {}", json_type_name(&other)),
            )),
            Err(e) => Err(self.corrupt(id, e.to_string())),
        }
    }

    /// Public projection of a stored body; its `_id` must match the row.
    fn project(&self, id: &str, stored: Fields) -> Result<Document, StoreError> {
        let public = document::to_public(stored).map_err(|e| self.corrupt(id, e.to_string()))?;
        if public.id != id {
            return Err(self.corrupt(id, format!("body is keyed '{}'", public.id)));
        }
        Ok(public)
    }

    fn corrupt(&self, id: &str, reason: String) -> StoreError {
        StoreError::Corrupt {
            kind: self.kind,
            id: id.to_string(),
            reason,
        }
    }
}

impl ResourceStore for DocumentRepository {
    fn kind(&self) -> EntityKind {
        self.kind
    }

    async fn list_all(&self) -> Result<Vec<Document>, StoreError> {
        self.list().await
    }

    async fn create(&self, fields: Fields) -> Result<Document, StoreError> {
        self.insert(fields).await
    }

    async fn update(&self, id: &str, patch: Fields) -> Result<Document, StoreError> {
        self.merge(id, &patch).await
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.remove(id).await
    }

    async fn upsert(&self, fields: Fields) -> Result<Document, StoreError> {
        self.insert_or_merge(fields).await
    }
}
