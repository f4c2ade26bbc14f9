mod document_repo;

pub use document_repo::DocumentRepository;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;

use crate::models::EntityKind;

/// Initialize the database connection pool and run migrations
pub async fn init_db(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
    }

    // WAL lets the server keep reading while a bulk sync writes
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Handle to the document database.
///
/// Opened once at startup and handed to whatever needs collections; closing
/// it waits for in-flight connections to be returned.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn open(path: &Path) -> Result<Self, sqlx::Error> {
        let pool = init_db(path).await?;
        tracing::info!("Opened document store at {}", path.display());
        Ok(Self { pool })
    }

    /// The collection holding documents of `kind`.
    pub fn collection(&self, kind: EntityKind) -> DocumentRepository {
        DocumentRepository::new(self.pool.clone(), kind)
    }

    /// One collection per entity kind, in registry order.
    pub fn collections(&self) -> Vec<DocumentRepository> {
        EntityKind::ALL
            .into_iter()
            .map(|kind| self.collection(kind))
            .collect()
    }

    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Closed document store");
    }
}
