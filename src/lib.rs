//! Foodstore
//!
//! Document store behind the food ordering apps: one generic CRUD surface
//! over six entity kinds, plus a bulk loader for snapshot files.

pub mod config;
pub mod db;
pub mod models;
pub mod server;
pub mod store;
pub mod sync;

pub use db::{DocumentRepository, Store};
pub use models::{Document, EntityKind, Fields};
pub use store::{ResourceStore, StoreError};
