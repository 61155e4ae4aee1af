//! # Retail Seeder
//!
//! Fills the retail database with fabricated records.
//!
//! ## Flow
//! 1. Connect and ping. No connection, no run.
//!
//! 2. `--reset` drops the database first. A failed drop is logged and ignored, the collection may just not exist yet.
//!
//! 3. Generate all four collections in memory, parents first (products, customers, orders, reviews).
//!    Counts are `max(min_docs, 25)`, orders `max(min_docs, 30)`.
//!
//! 4. Per collection, in the same order: skip if it already has `min_docs` documents, clear it first under `--force`,
//!    then upload in batches.
//!
//! 5. Recount everything. The run succeeds only if every collection reached `min_docs`.
//!
//! ## Throughput
//! Cosmos DB bills in request units and throttles past the provisioned budget, so the upload is deliberately slow:
//! - Fixed pause after every successful batch.
//! - Throttled batches back off exponentially, `batch_delay * 2^attempt` plus up to half a second of jitter,
//!   and are dropped after 5 retries.
//! - Partially rejected batches are not retried, only counted.
//! - Any other failure falls back to one insert per document.
//!
//! ## Notes
//! - Nothing is idempotent. Each run generates different data, the `min_docs` skip is the only thing
//!   that stops a second run from doubling the collections.

use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use rand::{SeedableRng, rngs::StdRng};
use records::{
    COLLECTIONS, CUSTOMERS, ORDERS, PRODUCTS, REVIEWS,
    bson::Document,
    config::StoreConfig,
    mongo::MongoStore,
    store::{DocumentCollection, DocumentStore, to_documents},
};
use tokio::time::sleep;
use tracing::{info, warn};

pub mod config;
pub mod generate;
pub mod retry;
pub mod sync;
pub mod upload;

use config::SeedConfig;
use generate::{Counts, Dataset};
use sync::sync_collection;
use upload::BatchUploader;

const RESET_PAUSE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSummary {
    pub name: &'static str,
    pub count: u64,
    pub expected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub min_docs: u64,
    pub collections: Vec<CollectionSummary>,
}

impl Summary {
    pub fn all_met(&self) -> bool {
        self.collections
            .iter()
            .all(|collection| collection.count >= self.min_docs)
    }

    pub fn total_count(&self) -> u64 {
        self.collections.iter().map(|c| c.count).sum()
    }

    pub fn total_expected(&self) -> usize {
        self.collections.iter().map(|c| c.expected).sum()
    }
}

pub async fn run(config: &SeedConfig) -> Result<bool> {
    let store_config = StoreConfig::from_env()?;

    info!("Connecting to the document store...");
    let store = MongoStore::connect(&store_config).await?;
    info!("Using database: {}", store.database_name());

    let summary = seed_store(&store, config, Local::now().naive_local()).await?;

    Ok(summary.all_met())
}

pub async fn seed_store<S: DocumentStore>(
    store: &S,
    config: &SeedConfig,
    now: NaiveDateTime,
) -> Result<Summary> {
    if config.reset {
        warn!("Reset requested, dropping database...");
        match store.drop_database().await {
            Ok(()) => {
                info!("Database dropped");
                sleep(RESET_PAUSE).await;
            }
            Err(err) => warn!("Could not drop database (may not exist): {err}"),
        }
    }

    let counts = Counts::for_min_docs(usize::try_from(config.min_docs).unwrap_or(usize::MAX));
    let dataset = match config.seed {
        Some(seed) => Dataset::generate(&mut StdRng::seed_from_u64(seed), now, counts),
        None => Dataset::generate(&mut StdRng::from_entropy(), now, counts),
    };

    info!("Generated {} products", dataset.products.len());
    info!("Generated {} customers", dataset.customers.len());
    info!("Generated {} orders", dataset.orders.len());
    info!("Generated {} reviews", dataset.reviews.len());

    report_existing(store).await;

    let uploads: [(&'static str, Vec<Document>); 4] = [
        (PRODUCTS, to_documents(&dataset.products)?),
        (CUSTOMERS, to_documents(&dataset.customers)?),
        (ORDERS, to_documents(&dataset.orders)?),
        (REVIEWS, to_documents(&dataset.reviews)?),
    ];

    let uploader = BatchUploader::new(config.batch_size, config.batch_delay);

    for (name, documents) in &uploads {
        info!("Uploading {name}...");
        let collection = store.collection(name);
        sync_collection(&collection, documents, config, &uploader).await?;
    }

    let mut collections = Vec::with_capacity(COLLECTIONS.len());
    for (name, documents) in &uploads {
        let count = store.collection(name).count().await?;
        collections.push(CollectionSummary {
            name: *name,
            count,
            expected: documents.len(),
        });
    }

    let summary = Summary {
        min_docs: config.min_docs,
        collections,
    };

    log_summary(&summary);
    log_samples(store).await;

    Ok(summary)
}

async fn report_existing<S: DocumentStore>(store: &S) {
    let existing = match store.list_collection_names().await {
        Ok(names) => names,
        Err(err) => {
            warn!("Could not list collections: {err}");
            return;
        }
    };

    for name in COLLECTIONS {
        if !existing.iter().any(|existing| existing == name) {
            info!("{name}: new collection");
            continue;
        }

        match store.collection(name).count().await {
            Ok(count) => info!("{name}: {count} existing documents (will skip if populated)"),
            Err(err) => warn!("{name}: count failed: {err}"),
        }
    }
}

fn log_summary(summary: &Summary) {
    for collection in &summary.collections {
        let status = if collection.count >= summary.min_docs {
            "✓"
        } else {
            "✗"
        };

        info!(
            "{status} {:12}: {:4} documents (expected: {})",
            collection.name, collection.count, collection.expected
        );
    }

    info!(
        "Total uploaded: {}/{} documents",
        summary.total_count(),
        summary.total_expected()
    );

    if summary.all_met() {
        info!("SUCCESS: All collections meet minimum document requirements");
    } else {
        warn!(
            "Some collections have fewer than {} documents",
            summary.min_docs
        );
    }
}

async fn log_samples<S: DocumentStore>(store: &S) {
    for name in [PRODUCTS, ORDERS, REVIEWS] {
        let sample = match store.collection(name).find_one().await {
            Ok(Some(sample)) => sample,
            Ok(None) => continue,
            Err(err) => {
                warn!("Could not read a sample from {name}: {err}");
                continue;
            }
        };

        let field = |key: &str| {
            sample
                .get(key)
                .map(|value| value.to_string())
                .unwrap_or_else(|| "N/A".to_string())
        };

        match name {
            ORDERS => info!(
                "Sample {name}: id {}, customer_id {}, {} items",
                field("id"),
                field("customer_id"),
                sample.get_array("items").map(|items| items.len()).unwrap_or(0)
            ),
            REVIEWS => info!(
                "Sample {name}: id {}, product_id {}, customer_id {}, order_id {}, rating {}",
                field("id"),
                field("product_id"),
                field("customer_id"),
                field("order_id"),
                field("rating")
            ),
            _ => info!("Sample {name}: id {}", field("id")),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use records::{bson::doc, memory::MemoryStore};

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn config() -> SeedConfig {
        SeedConfig {
            min_docs: 30,
            batch_size: 10,
            seed: Some(42),
            ..SeedConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_store_is_filled() {
        let store = MemoryStore::new();

        let summary = seed_store(&store, &config(), now()).await.unwrap();

        assert!(summary.all_met());
        assert_eq!(summary.collections.len(), 4);
        assert_eq!(store.collection(PRODUCTS).len(), 30);
        assert_eq!(store.collection(ORDERS).len(), 30);
        assert_eq!(summary.total_count(), summary.total_expected() as u64);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_run_skips_populated_collections() {
        let store = MemoryStore::new();
        seed_store(&store, &config(), now()).await.unwrap();
        let calls_before = store.collection(REVIEWS).batch_calls().len();

        let summary = seed_store(&store, &config(), now()).await.unwrap();

        assert!(summary.all_met());
        assert_eq!(store.collection(REVIEWS).batch_calls().len(), calls_before);
        assert_eq!(store.collection(REVIEWS).len(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_drops_database() {
        let store = MemoryStore::new();
        store
            .collection(PRODUCTS)
            .seed((0..40).map(|i| doc! { "id": i }));

        let config = SeedConfig {
            reset: true,
            ..config()
        };
        seed_store(&store, &config, now()).await.unwrap();

        assert_eq!(store.drop_calls(), 1);
        assert_eq!(store.collection(PRODUCTS).len(), 30);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmet_threshold_reports_failure() {
        let store = MemoryStore::new();
        store
            .collection(CUSTOMERS)
            .fail_every_batch(records::memory::Fault::RateLimited);

        let summary = seed_store(&store, &config(), now()).await.unwrap();

        assert!(!summary.all_met());
        let customers = summary
            .collections
            .iter()
            .find(|c| c.name == CUSTOMERS)
            .unwrap();
        assert_eq!(customers.count, 0);
    }
}
