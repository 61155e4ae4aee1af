//! # MongoDB
//!
//! Azure Cosmos DB through its Mongo API.
//!
//! ## Requirements
//!
//! - Provisioned throughput (request units). Exceeding it rejects requests with code 16500,
//!   see [`crate::error::RATE_LIMIT_CODE`].
//! - Small collections, a few hundred documents each.
//!
//! ## Implementation
//!
//! - One client per process, connection checked with a `ping` before any work.
//! - 10 second server selection timeout, the only timeout anywhere.
//! - Bulk inserts are unordered so one rejected document does not stop the rest of the batch.

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, Database,
    bson::{Bson, Document, doc},
    error::ErrorKind,
    options::ClientOptions,
};
use tracing::info;

use crate::{
    config::StoreConfig,
    error::StoreError,
    store::{DocumentCollection, DocumentStore},
};

pub const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct MongoStore {
    database: Database,
}

#[derive(Clone)]
pub struct MongoCollection {
    inner: Collection<Document>,
}

impl MongoStore {
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(&config.connection_string)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);

        let client =
            Client::with_options(options).map_err(|e| StoreError::Connection(e.to_string()))?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        info!("Connected, using database {}", config.database);

        Ok(Self {
            database: client.database(&config.database),
        })
    }

    pub fn database_name(&self) -> &str {
        self.database.name()
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    type Collection = MongoCollection;

    fn collection(&self, name: &str) -> MongoCollection {
        MongoCollection {
            inner: self.database.collection(name),
        }
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.database.list_collection_names().await?)
    }

    async fn drop_database(&self) -> Result<(), StoreError> {
        Ok(self.database.drop().await?)
    }
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.count_documents(doc! {}).await?)
    }

    async fn insert_batch(&self, documents: &[Document]) -> Result<u64, StoreError> {
        match self.inner.insert_many(documents).ordered(false).await {
            Ok(result) => Ok(result.inserted_ids.len() as u64),
            Err(err) => match err.kind.as_ref() {
                ErrorKind::InsertMany(failure) => {
                    let failures: Vec<String> = failure
                        .write_errors
                        .iter()
                        .flatten()
                        .map(|e| format!("{} (code {})", e.message, e.code))
                        .collect();

                    Err(StoreError::PartialWrite {
                        inserted: documents.len().saturating_sub(failures.len()) as u64,
                        failures,
                    })
                }
                _ => Err(err.into()),
            },
        }
    }

    async fn insert_one(&self, document: &Document) -> Result<(), StoreError> {
        self.inner.insert_one(document).await?;

        Ok(())
    }

    async fn first_ids(&self, limit: i64) -> Result<Vec<Bson>, StoreError> {
        let documents: Vec<Document> = self
            .inner
            .find(doc! {})
            .projection(doc! { "_id": 1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        Ok(documents
            .into_iter()
            .filter_map(|mut document| document.remove("_id"))
            .collect())
    }

    async fn delete_ids(&self, ids: &[Bson]) -> Result<u64, StoreError> {
        let result = self
            .inner
            .delete_many(doc! { "_id": { "$in": ids.to_vec() } })
            .await?;

        Ok(result.deleted_count)
    }

    async fn find_all(&self) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .inner
            .find(doc! {})
            .projection(doc! { "_id": 0 })
            .await?
            .try_collect()
            .await?)
    }

    async fn find_one(&self) -> Result<Option<Document>, StoreError> {
        Ok(self.inner.find_one(doc! {}).await?)
    }

    async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>, StoreError> {
        Ok(self.inner.aggregate(pipeline).await?.try_collect().await?)
    }
}
