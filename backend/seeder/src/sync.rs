use records::{bson::Document, error::StoreError, store::DocumentCollection};
use tracing::info;

use crate::{config::SeedConfig, upload::BatchUploader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Already at or above the threshold, nothing written.
    Skipped { existing: u64 },
    Uploaded { deleted: u64, inserted: u64 },
}

/// Uploads `documents` unless the collection already holds `min_docs` of them. With `force`, the
/// collection is emptied first and always refilled.
pub async fn sync_collection<C>(
    collection: &C,
    documents: &[Document],
    config: &SeedConfig,
    uploader: &BatchUploader,
) -> Result<SyncOutcome, StoreError>
where
    C: DocumentCollection + ?Sized,
{
    let name = collection.name();
    let existing = collection.count().await?;

    if !config.force && existing >= config.min_docs {
        info!("Skipping {name} - {existing} documents already exist");
        return Ok(SyncOutcome::Skipped { existing });
    }

    let mut deleted = 0;
    if config.force && existing > 0 {
        info!("Clearing existing {existing} documents from {name}...");
        deleted = uploader.clear_collection(collection).await;
        info!("Deleted {deleted} old documents");
    }

    let inserted = uploader.insert_in_batches(collection, documents).await;
    info!("Uploaded {inserted} documents to {name} collection");

    Ok(SyncOutcome::Uploaded { deleted, inserted })
}
