//! Content save pipeline
//!
//! ```text
//! {section, content}
//!     → load (fresh from disk)
//!     → merge::apply_section (+ MenuNormalizer for `menu`)
//!     → ContentStore::save (stamp last_updated, tmp + rename)
//! ```
//!
//! Read-merge-write runs on the blocking pool while holding an async write
//! lock, so two saves in this process never interleave.

pub mod menu;
pub mod merge;
pub mod migrate;
mod numeric;
pub mod store;

pub use menu::{LegacyQuantityPolicy, MenuError, MenuNormalizer};
pub use merge::{apply_section, merge_maps, validate_section_name};
pub use migrate::{MigrationReport, migrate_legacy_quantities};
pub use store::{ContentStore, DocumentFs, StdFs, StoreError};

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use shared::content::KNOWN_SECTIONS;
use shared::{AppError, AppResult, ContentDocument, Payload};
use tokio::sync::Mutex;

/// Result of a successful save
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub section: String,
    pub timestamp: String,
}

/// Result of a migration run; `timestamp` is set only when the file was written
#[derive(Debug, Clone)]
pub struct MigrationOutcome {
    pub report: MigrationReport,
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ContentService {
    store: Arc<ContentStore>,
    normalizer: MenuNormalizer,
    write_lock: Arc<Mutex<()>>,
}

impl ContentService {
    pub fn new(store: ContentStore, normalizer: MenuNormalizer) -> Self {
        Self {
            store: Arc::new(store),
            normalizer,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Current document
    pub async fn document(&self) -> AppResult<ContentDocument> {
        let store = self.store.clone();
        blocking(move || store.load().map_err(AppError::from)).await
    }

    /// Merge one section into the stored document and persist it
    pub async fn save_section(&self, section: &str, content: Value) -> AppResult<SaveOutcome> {
        let section = validate_section_name(section)?.to_string();
        let payload = Payload::classify_ref(&content).name();
        if !KNOWN_SECTIONS.contains(&section.as_str()) {
            tracing::debug!(section = %section, "Saving section outside the editor's known set");
        }
        let started = Instant::now();
        let _guard = self.write_lock.lock().await;

        let store = self.store.clone();
        let normalizer = self.normalizer.clone();
        let name = section.clone();
        let result = blocking(move || {
            let mut document = store.load()?;
            apply_section(&mut document, &name, content, &normalizer)?;
            Ok(store.save(&mut document)?)
        })
        .await;

        match result {
            Ok(timestamp) => {
                tracing::info!(
                    section = %section,
                    payload,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Content saved"
                );
                Ok(SaveOutcome { section, timestamp })
            }
            Err(e) => {
                if !e.is_internal() {
                    tracing::warn!(
                        section = %section,
                        code = %e.code,
                        error = %e.message,
                        "Content save rejected"
                    );
                }
                Err(e)
            }
        }
    }

    /// Upgrade legacy quantities; writes only when something changed
    pub async fn migrate(&self) -> AppResult<MigrationOutcome> {
        let _guard = self.write_lock.lock().await;

        let store = self.store.clone();
        let outcome = blocking(move || {
            let mut document = store.load()?;
            let report = migrate_legacy_quantities(&mut document);
            let timestamp = if report.changed() {
                Some(store.save(&mut document)?)
            } else {
                None
            };
            Ok(MigrationOutcome { report, timestamp })
        })
        .await?;

        tracing::info!(
            items = outcome.report.items,
            upgraded = outcome.report.quantities_upgraded,
            promoted = outcome.report.descriptions_promoted,
            skipped = outcome.report.skipped.len(),
            written = outcome.timestamp.is_some(),
            "Legacy quantity migration finished"
        );
        Ok(outcome)
    }
}

async fn blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::internal(format!("Content task failed: {e}")))?
}
