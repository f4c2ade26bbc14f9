//! HTTP surface of the document store.
//!
//! # Endpoints
//!
//! - `GET /`: Health check
//! - `GET /{collection}`: List every document of a kind
//! - `POST /{collection}`: Create a document (`201`)
//! - `PATCH /{collection}/{id}`: Merge fields into a document
//! - `DELETE /{collection}/{id}`: Delete a document
//!
//! Collections are `categories`, `menuItems`, `restaurants`, `orders`,
//! `users` and `drones`. Errors are answered with `{}`.

mod cors;
mod error;
mod router;

pub use error::ApiError;
pub use router::resource_router;

use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::db::Store;
use crate::store::ResourceStore;

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Health check endpoint
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

/// Builds the full application over the collections of `store`.
pub fn app(store: &Store) -> Router {
    routes(store.collections())
}

/// Builds the full application over any set of resource stores, nesting
/// each under its collection path.
pub fn routes<S: ResourceStore>(stores: impl IntoIterator<Item = S>) -> Router {
    let mut app = Router::new().route("/", get(health));

    for store in stores {
        let path = format!("/{}", store.kind().collection());
        app = app.nest(&path, resource_router(store));
    }

    app.fallback(not_found)
        .layer(CatchPanicLayer::custom(error::panic_response))
        .layer(middleware::from_fn(cors::cors_middleware))
        .layer(TraceLayer::new_for_http())
}
