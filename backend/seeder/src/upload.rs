use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use records::{
    bson::Document,
    error::StoreError,
    store::DocumentCollection,
};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::retry::{RetryError, RetryPolicy};

pub const DELETE_PAGE_SIZE: i64 = 20;
pub const DELETE_PAGE_DELAY: Duration = Duration::from_millis(1_500);
pub const DELETE_RETRY_DELAY: Duration = Duration::from_secs(3);
pub const SINGLE_INSERT_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy)]
pub struct BatchUploader {
    pub batch_size: usize,
    pub batch_delay: Duration,
    pub policy: RetryPolicy,
}

impl BatchUploader {
    pub fn new(batch_size: usize, batch_delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            batch_delay,
            policy: RetryPolicy::new(batch_delay),
        }
    }

    /// Inserts `documents` in batches and returns how many made it into the collection.
    ///
    /// Not idempotent: running it twice inserts everything twice.
    pub async fn insert_in_batches<C>(&self, collection: &C, documents: &[Document]) -> u64
    where
        C: DocumentCollection + ?Sized,
    {
        let total = documents.len();
        let mut inserted = 0;

        let pb = progress_bar(total as u64, collection.name());

        for (index, batch) in documents.chunks(self.batch_size.max(1)).enumerate() {
            let batch_number = index + 1;

            match self.policy.run(move || collection.insert_batch(batch)).await {
                Ok(count) => {
                    inserted += count;
                    info!("Inserted {inserted}/{total} documents (batch {batch_number})");

                    pb.inc(batch.len() as u64);
                    sleep(self.batch_delay).await;
                }
                Err(RetryError::Failed(StoreError::PartialWrite {
                    inserted: count,
                    failures,
                })) => {
                    inserted += count;
                    warn!(
                        "Bulk write in batch {batch_number}: inserted {count}/{}; errors: {}",
                        batch.len(),
                        failures.len()
                    );
                    if let Some(sample) = failures.first() {
                        warn!("Sample error: {sample}");
                    }

                    pb.inc(batch.len() as u64);
                    sleep(self.batch_delay * 2).await;
                }
                Err(RetryError::Exhausted { attempts }) => {
                    warn!("Max retries exceeded for batch {batch_number} after {attempts} attempts, skipping");
                    pb.inc(batch.len() as u64);
                }
                Err(RetryError::Failed(err)) => {
                    warn!("Batch {batch_number} failed ({err}), inserting one at a time");
                    inserted += self.insert_individually(collection, batch).await;
                    pb.inc(batch.len() as u64);
                }
            }
        }

        pb.finish_with_message(format!("{inserted}/{total}"));
        inserted
    }

    async fn insert_individually<C>(&self, collection: &C, batch: &[Document]) -> u64
    where
        C: DocumentCollection + ?Sized,
    {
        let mut inserted = 0;

        for document in batch {
            match collection.insert_one(document).await {
                Ok(()) => {
                    inserted += 1;
                    sleep(SINGLE_INSERT_DELAY).await;
                }
                Err(err) => warn!("Failed to insert document: {err}"),
            }
        }

        inserted
    }

    /// Deletes every document, a page of ids at a time. Delete failures are retried forever; the loop
    /// only ends once the collection reads back empty.
    pub async fn clear_collection<C>(&self, collection: &C) -> u64
    where
        C: DocumentCollection + ?Sized,
    {
        let mut deleted = 0;

        loop {
            let ids = match collection.first_ids(DELETE_PAGE_SIZE).await {
                Ok(ids) => ids,
                Err(err) => {
                    warn!("Listing {} failed: {err}, retrying...", collection.name());
                    sleep(DELETE_RETRY_DELAY).await;
                    continue;
                }
            };

            if ids.is_empty() {
                break;
            }

            match collection.delete_ids(&ids).await {
                Ok(count) => {
                    deleted += count;
                    sleep(DELETE_PAGE_DELAY).await;
                }
                Err(err) => {
                    warn!("Delete error: {err}, retrying...");
                    sleep(DELETE_RETRY_DELAY).await;
                }
            }
        }

        deleted
    }
}

fn progress_bar(len: u64, name: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);

    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
    ) {
        pb.set_style(style.progress_chars("=> "));
    }
    pb.set_message(format!("Uploading {name}"));

    pb
}

#[cfg(test)]
mod tests {
    use records::{
        bson::doc,
        memory::{Fault, MemoryCollection},
    };

    use super::*;

    fn documents(n: usize) -> Vec<Document> {
        (1..=n).map(|i| doc! { "id": format!("P{i:04}") }).collect()
    }

    fn uploader() -> BatchUploader {
        BatchUploader::new(10, Duration::from_secs(2))
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_batches_succeed() {
        let collection = MemoryCollection::new("products");

        let inserted = uploader().insert_in_batches(&collection, &documents(25)).await;

        assert_eq!(inserted, 25);
        let sizes: Vec<usize> = collection.batch_calls().iter().map(|(_, n)| *n).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_delay_between_batches() {
        let collection = MemoryCollection::new("products");

        uploader().insert_in_batches(&collection, &documents(30)).await;

        let calls = collection.batch_calls();
        for pair in calls.windows(2) {
            let waited = pair[1].0 - pair[0].0;
            assert!(waited >= Duration::from_secs(2));
            assert!(waited < Duration::from_millis(2_001));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_failure_counts_inserted_and_moves_on() {
        let collection = MemoryCollection::new("orders");
        collection.push_fault(Fault::Partial { rejected: 3 });

        let inserted = uploader().insert_in_batches(&collection, &documents(20)).await;

        assert_eq!(inserted, 17);
        assert_eq!(collection.len(), 17);
        assert_eq!(collection.batch_calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_batch_is_abandoned() {
        let collection = MemoryCollection::new("reviews");
        collection.fail_every_batch(Fault::RateLimited);
        let uploader = uploader();

        let inserted = uploader.insert_in_batches(&collection, &documents(5)).await;

        assert_eq!(inserted, 0);
        let calls = collection.batch_calls();
        assert_eq!(calls.len() as u32, uploader.policy.max_retries + 1);

        for (k, pair) in calls.windows(2).enumerate() {
            let waited = pair[1].0 - pair[0].0;
            let expected = uploader.policy.delay(k as u32, 0.0);
            assert!(waited >= expected, "retry {k} waited {waited:?}");
            assert!(
                waited <= expected + uploader.policy.max_jitter + Duration::from_millis(1),
                "retry {k} waited {waited:?}"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_batch_backs_off_before_next_batch() {
        let collection = MemoryCollection::new("reviews");
        let uploader = uploader();
        for _ in 0..=uploader.policy.max_retries {
            collection.push_fault(Fault::RateLimited);
        }

        let inserted = uploader.insert_in_batches(&collection, &documents(15)).await;

        assert_eq!(inserted, 5);
        let calls = collection.batch_calls();
        assert_eq!(calls.len() as u32, uploader.policy.max_retries + 2);

        let last_failed = calls[calls.len() - 2].0;
        let next_batch = calls[calls.len() - 1].0;
        let waited = next_batch - last_failed;
        let expected = uploader.policy.delay(uploader.policy.max_retries, 0.0);

        assert!(waited >= expected, "next batch after {waited:?}");
        assert!(
            waited <= expected + uploader.policy.max_jitter + Duration::from_millis(1),
            "next batch after {waited:?}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_then_success() {
        let collection = MemoryCollection::new("customers");
        collection.push_fault(Fault::RateLimited);
        collection.push_fault(Fault::RateLimited);

        let inserted = uploader().insert_in_batches(&collection, &documents(10)).await;

        assert_eq!(inserted, 10);
        assert_eq!(collection.batch_calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_error_falls_back_to_single_inserts() {
        let collection = MemoryCollection::new("products");
        collection.push_fault(Fault::Transient);
        collection.fail_single_inserts(2);

        let inserted = uploader().insert_in_batches(&collection, &documents(10)).await;

        assert_eq!(inserted, 8);
        assert_eq!(collection.single_insert_calls(), 10);
        assert_eq!(collection.len(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_collection_pages_through() {
        let collection = MemoryCollection::new("orders");
        collection.seed(documents(45));

        let deleted = uploader().clear_collection(&collection).await;

        assert_eq!(deleted, 45);
        assert!(collection.is_empty());
        assert_eq!(collection.delete_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_collection_retries_delete_errors() {
        let collection = MemoryCollection::new("orders");
        collection.seed(documents(5));
        collection.fail_deletes(4);

        let deleted = uploader().clear_collection(&collection).await;

        assert_eq!(deleted, 5);
        assert_eq!(collection.delete_calls(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_empty_collection() {
        let collection = MemoryCollection::new("reviews");

        assert_eq!(uploader().clear_collection(&collection).await, 0);
        assert_eq!(collection.delete_calls(), 0);
    }
}
