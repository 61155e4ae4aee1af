use async_trait::async_trait;
use mongodb::bson::{self, Bson, Document};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::StoreError;

/// Operations the seeder and dashboard need from a single collection.
///
/// Every call is one round trip. Nothing here retries, that is left to callers.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    fn name(&self) -> &str;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Unordered bulk insert. Returns the number of documents inserted, or
    /// [`StoreError::PartialWrite`] when only some of them made it.
    async fn insert_batch(&self, documents: &[Document]) -> Result<u64, StoreError>;

    async fn insert_one(&self, document: &Document) -> Result<(), StoreError>;

    /// `_id` of up to `limit` documents, in natural order.
    async fn first_ids(&self, limit: i64) -> Result<Vec<Bson>, StoreError>;

    async fn delete_ids(&self, ids: &[Bson]) -> Result<u64, StoreError>;

    /// Every document with `_id` projected away.
    async fn find_all(&self) -> Result<Vec<Document>, StoreError>;

    async fn find_one(&self) -> Result<Option<Document>, StoreError>;

    async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>, StoreError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    type Collection: DocumentCollection + 'static;

    fn collection(&self, name: &str) -> Self::Collection;

    async fn list_collection_names(&self) -> Result<Vec<String>, StoreError>;

    async fn drop_database(&self) -> Result<(), StoreError>;
}

pub fn to_documents<T: Serialize>(records: &[T]) -> Result<Vec<Document>, StoreError> {
    records
        .iter()
        .map(|record| bson::to_document(record).map_err(StoreError::from))
        .collect()
}

pub fn from_documents<T: DeserializeOwned>(documents: Vec<Document>) -> Result<Vec<T>, StoreError> {
    documents
        .into_iter()
        .map(|document| bson::from_document(document).map_err(StoreError::from))
        .collect()
}

/// Reads a whole collection into typed records.
pub async fn load_all<T, C>(collection: &C) -> Result<Vec<T>, StoreError>
where
    T: DeserializeOwned,
    C: DocumentCollection + ?Sized,
{
    from_documents(collection.find_all().await?)
}
