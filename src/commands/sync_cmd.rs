//! Bulk-load a snapshot file into the document store.

use clap::Args;
use std::path::PathBuf;

use super::OutputFormat;
use foodstore::config::Config;
use foodstore::db::Store;
use foodstore::sync::{BulkSynchronizer, Snapshot, SnapshotError, SyncReport};

/// Synchronize a snapshot file into the store
#[derive(Args)]
pub struct SyncCommand {
    /// Snapshot file (defaults to `snapshot_path` from the config)
    snapshot: Option<PathBuf>,

    /// Upserts in flight per kind
    #[arg(long)]
    concurrency: Option<usize>,

    /// Exit with an error if any record was not applied
    #[arg(long)]
    strict: bool,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl SyncCommand {
    pub async fn run(&self, config: &Config) -> Result<(), SyncCommandError> {
        let path = self
            .snapshot
            .clone()
            .or_else(|| config.snapshot_path.as_ref().map(|p| p.value.clone()))
            .ok_or(SyncCommandError::NoSnapshot)?;

        // Both of these abort the run; record-level failures do not
        let snapshot = Snapshot::load(&path)?;
        let store = Store::open(&config.database_path.value)
            .await
            .map_err(SyncCommandError::StoreUnavailable)?;

        let concurrency = self.concurrency.unwrap_or(config.sync_concurrency.value);
        let report = BulkSynchronizer::new(store.collections())
            .with_concurrency(concurrency)
            .run(&snapshot)
            .await;
        store.close().await;

        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&report)
                    .map_err(|e| SyncCommandError::Output(e.to_string()))?;
                println!("{}", json);
            }
            OutputFormat::Text => print_report(&path, &report),
        }

        if self.strict && !report.is_clean() {
            return Err(SyncCommandError::Incomplete(report.failed()));
        }
        Ok(())
    }
}

fn print_report(path: &std::path::Path, report: &SyncReport) {
    println!("Synchronized {}", path.display());
    println!();

    for kind in &report.kinds {
        let collection = kind.kind.collection();
        if let Some(reason) = &kind.rejected {
            println!("  ✗ {}: skipped ({})", collection, reason);
            continue;
        }

        let status = if kind.failures.is_empty() { "✓" } else { "!" };
        println!(
            "  {} {}: {}/{} applied",
            status, collection, kind.applied, kind.submitted
        );
        for failure in &kind.failures {
            println!(
                "      record {} ({}): {}",
                failure.index,
                failure.id.as_deref().unwrap_or("no id"),
                failure.reason
            );
        }
    }

    if !report.ignored_keys.is_empty() {
        println!();
        println!("Ignored keys: {}", report.ignored_keys.join(", "));
    }

    println!();
    if report.is_clean() {
        println!("{} record(s) applied.", report.applied());
    } else {
        println!(
            "{} record(s) applied, {} failed.",
            report.applied(),
            report.failed()
        );
    }
}

/// Errors from the sync command
#[derive(Debug)]
pub enum SyncCommandError {
    /// No snapshot given and none configured
    NoSnapshot,
    /// The snapshot could not be read
    Snapshot(SnapshotError),
    /// The database could not be opened
    StoreUnavailable(sqlx::Error),
    /// Some records were not applied (with --strict)
    Incomplete(usize),
    /// The report could not be written
    Output(String),
}

impl std::fmt::Display for SyncCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncCommandError::NoSnapshot => write!(
                f,
                "No snapshot file given. Pass a path or set snapshot_path / FOODSTORE_SNAPSHOT."
            ),
            SyncCommandError::Snapshot(e) => write!(f, "{}", e),
            SyncCommandError::StoreUnavailable(e) => write!(f, "Failed to open store: {}", e),
            SyncCommandError::Incomplete(n) => write!(f, "{} record(s) were not applied", n),
            SyncCommandError::Output(e) => write!(f, "Failed to write report: {}", e),
        }
    }
}

impl std::error::Error for SyncCommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncCommandError::Snapshot(e) => Some(e),
            SyncCommandError::StoreUnavailable(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SnapshotError> for SyncCommandError {
    fn from(e: SnapshotError) -> Self {
        SyncCommandError::Snapshot(e)
    }
}
