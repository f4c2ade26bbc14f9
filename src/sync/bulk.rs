use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::Value;

use super::snapshot::Snapshot;
use crate::models::document::{self, json_type_name};
use crate::models::{Document, EntityKind};
use crate::store::{ResourceStore, StoreError};

/// Upserts in flight at once within one kind's batch.
pub const DEFAULT_CONCURRENCY: usize = 16;

/// A record that could not be applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFailure {
    /// Position of the record in its snapshot array.
    pub index: usize,
    /// Identifier the record asked for, if it carried a usable one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub reason: String,
}

/// Outcome of synchronizing one kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KindReport {
    pub kind: EntityKind,
    pub submitted: usize,
    pub applied: usize,
    pub failures: Vec<RecordFailure>,
    /// Set when the kind's snapshot value was not an array and nothing ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<String>,
}

impl KindReport {
    fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            submitted: 0,
            applied: 0,
            failures: Vec::new(),
            rejected: None,
        }
    }
}

/// Outcome of a whole synchronization run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub kinds: Vec<KindReport>,
    /// Snapshot keys that are not collection names.
    pub ignored_keys: Vec<String>,
}

impl SyncReport {
    pub fn kind(&self, kind: EntityKind) -> Option<&KindReport> {
        self.kinds.iter().find(|report| report.kind == kind)
    }

    pub fn submitted(&self) -> usize {
        self.kinds.iter().map(|k| k.submitted).sum()
    }

    pub fn applied(&self) -> usize {
        self.kinds.iter().map(|k| k.applied).sum()
    }

    pub fn failed(&self) -> usize {
        self.kinds.iter().map(|k| k.failures.len()).sum()
    }

    /// True when every submitted record was applied and no kind was rejected.
    pub fn is_clean(&self) -> bool {
        self.kinds
            .iter()
            .all(|k| k.failures.is_empty() && k.rejected.is_none())
    }
}

/// Loads a snapshot into a set of stores, one unordered batch per kind.
///
/// A record that fails is reported and skipped; it never stops the rest of
/// its batch or other kinds.
pub struct BulkSynchronizer<S> {
    stores: Vec<S>,
    concurrency: usize,
}

impl<S: ResourceStore> BulkSynchronizer<S> {
    /// Kinds are processed in registry order regardless of the order given.
    pub fn new(stores: impl IntoIterator<Item = S>) -> Self {
        let mut stores: Vec<S> = stores.into_iter().collect();
        stores.sort_by_key(|store| store.kind());
        stores.dedup_by_key(|store| store.kind());
        Self {
            stores,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn run(&self, snapshot: &Snapshot) -> SyncReport {
        let ignored_keys = snapshot.unknown_keys();
        for key in &ignored_keys {
            tracing::info!("Ignoring unknown snapshot key '{}'", key);
        }

        for kind in EntityKind::ALL {
            if snapshot.records(kind).is_some() && !self.stores.iter().any(|s| s.kind() == kind) {
                tracing::warn!("No store configured for {}, skipping", kind.collection());
            }
        }

        let mut kinds = Vec::new();
        for store in &self.stores {
            if let Some(records) = snapshot.records(store.kind()) {
                kinds.push(self.sync_kind(store, records).await);
            }
        }

        SyncReport {
            kinds,
            ignored_keys,
        }
    }

    async fn sync_kind(&self, store: &S, records: &Value) -> KindReport {
        let kind = store.kind();
        let mut report = KindReport::new(kind);

        let Value::Array(records) = records else {
            let reason = format!(
                "expected an array of records, found {}",
                json_type_name(records)
            );
            tracing::warn!("Skipping {}: {}", kind.collection(), reason);
            report.rejected = Some(reason);
            return report;
        };
        report.submitted = records.len();

        let mut results: Vec<(usize, Result<Document, StoreError>)> =
            stream::iter(records.iter().enumerate())
                .map(|(index, record)| async move { (index, upsert_record(store, record).await) })
                .buffer_unordered(self.concurrency)
                .collect()
                .await;
        results.sort_by_key(|(index, _)| *index);

        for (index, result) in results {
            match result {
                Ok(_) => report.applied += 1,
                Err(e) => {
                    let id = document::requested_id(&records[index]);
                    tracing::warn!(
                        kind = %kind,
                        index,
                        id = id.as_deref().unwrap_or("-"),
                        "Record not applied: {}",
                        e
                    );
                    report.failures.push(RecordFailure {
                        index,
                        id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Synchronized {}/{} {}",
            report.applied,
            report.submitted,
            kind.collection()
        );
        report
    }
}

/// Records without an identifier are keyed by their content, so loading the
/// same snapshot again updates them instead of adding copies.
async fn upsert_record<S: ResourceStore>(
    store: &S,
    record: &Value,
) -> Result<Document, StoreError> {
    let mut fields = document::into_fields(record.clone())?;
    let id = document::resolve_content_id(store.kind(), &mut fields)?;
    fields.insert(document::ID_KEY.to_string(), Value::String(id));
    store.upsert(fields).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use serde_json::json;
    use tempfile::TempDir;

    struct TestContext {
        store: Store,
        _temp_dir: TempDir,
    }

    async fn setup() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::open(&temp_dir.path().join("test.db")).await.unwrap();
        TestContext {
            store,
            _temp_dir: temp_dir,
        }
    }

    fn snapshot(value: Value) -> Snapshot {
        Snapshot::from_value(value).unwrap()
    }

    async fn contents(store: &Store) -> Vec<Vec<Document>> {
        let mut all = Vec::new();
        for collection in store.collections() {
            all.push(collection.list_all().await.unwrap());
        }
        all
    }

    #[tokio::test]
    async fn test_loads_every_kind() {
        let ctx = setup().await;
        let sync = BulkSynchronizer::new(ctx.store.collections());

        let report = sync
            .run(&snapshot(json!({
                "categories": [{"id": "c1", "title": "Pizza"}],
                "menuItems": [{"_id": "m1", "title": "Margherita", "categoryId": "c1"}],
                "restaurants": [{"id": "r1", "name": "Luigi's"}],
                "orders": [{"userId": "u1", "items": []}],
                "users": [{"id": "u1", "name": "Ada"}],
                "drones": [{"id": "d1", "status": "idle"}]
            })))
            .await;

        assert!(report.is_clean());
        assert_eq!(report.submitted(), 6);
        assert_eq!(report.applied(), 6);
        let kinds: Vec<EntityKind> = report.kinds.iter().map(|k| k.kind).collect();
        assert_eq!(kinds, EntityKind::ALL.to_vec());

        let items = ctx.store.collection(EntityKind::MenuItem).list_all().await.unwrap();
        assert_eq!(items[0].id, "m1");
        assert!(!items[0].fields.contains_key("_id"));
    }

    #[tokio::test]
    async fn test_running_twice_is_idempotent() {
        let ctx = setup().await;
        let sync = BulkSynchronizer::new(ctx.store.collections());
        let data = snapshot(json!({
            "categories": [{"id": "c1", "title": "Pizza"}, {"id": "c2", "title": "Pasta"}],
            "users": [{"_id": "u1", "name": "Ada", "address": {"city": "Turin"}}]
        }));

        sync.run(&data).await;
        let first = contents(&ctx.store).await;
        let report = sync.run(&data).await;
        let second = contents(&ctx.store).await;

        assert_eq!(first, second);
        assert_eq!(report.applied(), 3);
        assert_eq!(second[0].len(), 2);
    }

    #[tokio::test]
    async fn test_records_without_ids_are_not_duplicated() {
        let ctx = setup().await;
        let sync = BulkSynchronizer::new(ctx.store.collections());
        let data = snapshot(json!({
            "orders": [{"userId": "u1", "total": 5}, {"userId": "u2", "total": 7}]
        }));

        let orders = ctx.store.collection(EntityKind::Order);

        sync.run(&data).await;
        let first = orders.list_all().await.unwrap();
        let report = sync.run(&data).await;
        let second = orders.list_all().await.unwrap();

        assert!(report.is_clean());
        assert_eq!(second.len(), 2);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_upsert_keeps_unlisted_fields() {
        let ctx = setup().await;
        let categories = ctx.store.collection(EntityKind::Category);
        let existing = json!({"id": "c1", "title": "Pizza", "image": "p.png"});
        categories
            .create(document::into_fields(existing).unwrap())
            .await
            .unwrap();

        BulkSynchronizer::new(ctx.store.collections())
            .run(&snapshot(json!({"categories": [{"id": "c1", "title": "Pizza Deluxe"}]})))
            .await;

        let doc = categories.get_by_id("c1").await.unwrap().unwrap();
        assert_eq!(doc.fields["title"], "Pizza Deluxe");
        assert_eq!(doc.fields["image"], "p.png");
    }

    #[tokio::test]
    async fn test_does_not_delete_missing_records() {
        let ctx = setup().await;
        let sync = BulkSynchronizer::new(ctx.store.collections());

        sync.run(&snapshot(json!({"drones": [{"id": "d1"}, {"id": "d2"}]})))
            .await;
        sync.run(&snapshot(json!({"drones": [{"id": "d1"}]}))).await;

        let drones = ctx.store.collection(EntityKind::Drone).list_all().await.unwrap();
        assert_eq!(drones.len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_records_do_not_block_batch() {
        let ctx = setup().await;
        let sync = BulkSynchronizer::new(ctx.store.collections()).with_concurrency(2);

        let report = sync
            .run(&snapshot(json!({
                "categories": [
                    {"id": "c1", "title": "Pizza"},
                    42,
                    {"id": {"nested": true}, "title": "Bad id"},
                    {"id": "c2", "title": "Pasta"}
                ],
                "users": [{"id": "u1"}]
            })))
            .await;

        let categories = report.kind(EntityKind::Category).unwrap();
        assert_eq!(categories.submitted, 4);
        assert_eq!(categories.applied, 2);
        let failed: Vec<usize> = categories.failures.iter().map(|f| f.index).collect();
        assert_eq!(failed, vec![1, 2]);
        assert!(!report.is_clean());
        assert_eq!(report.failed(), 2);

        assert_eq!(report.kind(EntityKind::User).unwrap().applied, 1);
        let stored = ctx.store.collection(EntityKind::Category).list_all().await.unwrap();
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_keys_and_non_arrays() {
        let ctx = setup().await;
        let sync = BulkSynchronizer::new(ctx.store.collections());

        let report = sync
            .run(&snapshot(json!({
                "widgets": [{"id": "w1"}],
                "orders": {"id": "o1"},
                "drones": [{"id": "d1"}]
            })))
            .await;

        assert_eq!(report.ignored_keys, vec!["widgets".to_string()]);
        let orders = report.kind(EntityKind::Order).unwrap();
        assert_eq!(orders.submitted, 0);
        assert!(orders.rejected.as_deref().unwrap().contains("an object"));
        assert_eq!(report.kind(EntityKind::Drone).unwrap().applied, 1);
        assert!(report.kind(EntityKind::Category).is_none());
    }

    #[tokio::test]
    async fn test_only_configured_stores_are_written() {
        let ctx = setup().await;
        let sync = BulkSynchronizer::new(vec![
            ctx.store.collection(EntityKind::User),
            ctx.store.collection(EntityKind::Category),
        ]);

        let report = sync
            .run(&snapshot(json!({
                "users": [{"id": "u1"}],
                "categories": [{"id": "c1"}],
                "drones": [{"id": "d1"}]
            })))
            .await;

        let kinds: Vec<EntityKind> = report.kinds.iter().map(|k| k.kind).collect();
        assert_eq!(kinds, vec![EntityKind::Category, EntityKind::User]);
        assert!(ctx
            .store
            .collection(EntityKind::Drone)
            .list_all()
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_report_serializes_for_output() {
        let ctx = setup().await;
        let report = BulkSynchronizer::new(ctx.store.collections())
            .run(&snapshot(json!({"categories": ["oops"]})))
            .await;

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["kinds"][0]["kind"], "category");
        assert_eq!(value["kinds"][0]["failures"][0]["index"], 0);
        assert!(value["kinds"][0]["failures"][0].get("id").is_none());
    }
}
