//! Bulk synchronization of an external snapshot into the store.
//!
//! # Snapshot Format
//!
//! ```text
//! {
//!   "categories": [{"id": "c1", "title": "Pizza"}, ...],
//!   "menuItems": [{"_id": "m1", "title": "Margherita", "price": 9}, ...],
//!   ...
//! }
//! ```
//!
//! Keys are collection names; unknown keys are ignored. Every record is
//! upserted by identifier, so running the same snapshot twice leaves the
//! store unchanged.

mod bulk;
mod snapshot;

pub use bulk::{BulkSynchronizer, KindReport, RecordFailure, SyncReport, DEFAULT_CONCURRENCY};
pub use snapshot::{Snapshot, SnapshotError};
