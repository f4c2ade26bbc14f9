//! One CRUD surface, instantiated once per resource store.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde_json::Value;

use super::error::{empty_object, ApiError};
use crate::models::document::{into_fields, json_type_name};
use crate::models::{Document, Fields};
use crate::store::ResourceStore;

/// Builds `GET /`, `POST /`, `PATCH /{id}` and `DELETE /{id}` over `store`.
///
/// The router is meant to be nested under the store's collection path.
pub fn resource_router<S: ResourceStore>(store: S) -> Router {
    Router::new()
        .route("/", get(list_documents::<S>).post(create_document::<S>))
        .route(
            "/{id}",
            patch(update_document::<S>).delete(delete_document::<S>),
        )
        .with_state(store)
}

async fn list_documents<S: ResourceStore>(
    State(store): State<S>,
) -> Result<Json<Vec<Document>>, ApiError> {
    Ok(Json(store.list_all().await?))
}

async fn create_document<S: ResourceStore>(
    State(store): State<S>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Document>), ApiError> {
    let fields = request_fields(body)?;
    let document = store.create(fields).await?;
    tracing::info!(kind = %store.kind(), id = %document.id, "Created document");
    Ok((StatusCode::CREATED, Json(document)))
}

async fn update_document<S: ResourceStore>(
    State(store): State<S>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Document>, ApiError> {
    let patch = request_fields(body)?;
    let document = store.update(&id, patch).await?;
    tracing::debug!(kind = %store.kind(), id = %document.id, "Updated document");
    Ok(Json(document))
}

async fn delete_document<S: ResourceStore>(
    State(store): State<S>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    store.delete(&id).await?;
    tracing::info!(kind = %store.kind(), id = %id, "Deleted document");
    Ok(empty_object())
}

fn request_fields(body: Result<Json<Value>, JsonRejection>) -> Result<Fields, ApiError> {
    let Json(value) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let found = json_type_name(&value);
    into_fields(value)
        .map_err(|_| ApiError::BadRequest(format!("expected a JSON object, found {}", found)))
}
