//! The single error boundary of the HTTP surface.
//!
//! Every failure a handler can produce ends up here and is answered with an
//! empty JSON object; internal details only go to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::any::Any;

use crate::store::StoreError;

#[derive(Debug)]
pub enum ApiError {
    /// The addressed document (or route) does not exist.
    NotFound,
    /// The requested identifier is already taken.
    Conflict,
    /// The request body could not be used.
    BadRequest(String),
    /// Anything else. The detail is logged, never returned.
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => ApiError::NotFound,
            StoreError::DuplicateKey { .. } => ApiError::Conflict,
            StoreError::InvalidDocument(e) => ApiError::BadRequest(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(detail) => tracing::error!("Request failed: {}", detail),
            ApiError::BadRequest(detail) => tracing::debug!("Rejected request: {}", detail),
            _ => {}
        }
        (self.status(), empty_object()).into_response()
    }
}

/// `{}`, the body of every error and of a successful delete.
pub fn empty_object() -> Json<Value> {
    Json(json!({}))
}

/// Response for a handler that panicked.
pub fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Request handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, empty_object()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentError, EntityKind};

    #[test]
    fn test_store_errors_map_to_statuses() {
        let not_found = ApiError::from(StoreError::NotFound {
            kind: EntityKind::Order,
            id: "o1".into(),
        });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let duplicate = ApiError::from(StoreError::DuplicateKey {
            kind: EntityKind::Order,
            id: "o1".into(),
        });
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);

        let invalid = ApiError::from(StoreError::InvalidDocument(DocumentError::MissingId));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let corrupt = ApiError::from(StoreError::Corrupt {
            kind: EntityKind::Order,
            id: "o1".into(),
            reason: "truncated".into(),
        });
        assert_eq!(corrupt.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
