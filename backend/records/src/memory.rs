//! In-memory store with fault injection, for exercising upload and query paths without a database.
//!
//! Aggregation pipelines are not evaluated: [`MemoryCollection::aggregate`] hands back whatever rows
//! were registered with [`MemoryCollection::set_aggregate_rows`], or nothing while the collection
//! holds no documents.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use tokio::time::Instant;

use crate::{
    error::StoreError,
    store::{DocumentCollection, DocumentStore},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Fault {
    RateLimited,
    Transient,
    /// The last `rejected` documents of the batch are refused, the rest go in.
    Partial { rejected: usize },
}

impl Fault {
    fn into_error(self, batch: usize) -> StoreError {
        match self {
            Fault::RateLimited => {
                StoreError::RateLimited("Error=16500, RetryAfterMs=10, RequestRateTooLarge".to_string())
            }
            Fault::Transient => StoreError::Database("connection reset".to_string()),
            Fault::Partial { rejected } => StoreError::PartialWrite {
                inserted: batch.saturating_sub(rejected) as u64,
                failures: vec!["E11000 duplicate key error".to_string(); rejected.min(batch)],
            },
        }
    }
}

#[derive(Default)]
struct CollectionState {
    documents: Vec<Document>,
    next_id: i64,
    batch_faults: VecDeque<Fault>,
    persistent_fault: Option<Fault>,
    single_insert_failures: usize,
    delete_failures: usize,
    count_fails: bool,
    find_fails: bool,
    aggregate_rows: Vec<Document>,
    batch_calls: Vec<(Instant, usize)>,
    single_insert_calls: usize,
    delete_calls: usize,
}

impl CollectionState {
    fn push(&mut self, mut document: Document) {
        if !document.contains_key("_id") {
            self.next_id += 1;
            document.insert("_id", self.next_id);
        }

        self.documents.push(document);
    }
}

#[derive(Clone, Default)]
pub struct MemoryCollection {
    name: String,
    state: Arc<Mutex<CollectionState>>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CollectionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn seed(&self, documents: impl IntoIterator<Item = Document>) {
        let mut state = self.lock();
        for document in documents {
            state.push(document);
        }
    }

    /// Faults consumed one per bulk insert call, before any persistent fault.
    pub fn push_fault(&self, fault: Fault) {
        self.lock().batch_faults.push_back(fault);
    }

    pub fn fail_every_batch(&self, fault: Fault) {
        self.lock().persistent_fault = Some(fault);
    }

    pub fn fail_single_inserts(&self, times: usize) {
        self.lock().single_insert_failures = times;
    }

    pub fn fail_deletes(&self, times: usize) {
        self.lock().delete_failures = times;
    }

    pub fn fail_counts(&self) {
        self.lock().count_fails = true;
    }

    pub fn fail_finds(&self) {
        self.lock().find_fails = true;
    }

    pub fn set_aggregate_rows(&self, rows: Vec<Document>) {
        self.lock().aggregate_rows = rows;
    }

    pub fn documents(&self) -> Vec<Document> {
        self.lock().documents.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time and size of every bulk insert attempt, failed ones included.
    pub fn batch_calls(&self) -> Vec<(Instant, usize)> {
        self.lock().batch_calls.clone()
    }

    pub fn single_insert_calls(&self) -> usize {
        self.lock().single_insert_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.lock().delete_calls
    }
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let state = self.lock();
        if state.count_fails {
            return Err(StoreError::Database("count unavailable".to_string()));
        }

        Ok(state.documents.len() as u64)
    }

    async fn insert_batch(&self, documents: &[Document]) -> Result<u64, StoreError> {
        let mut state = self.lock();
        state.batch_calls.push((Instant::now(), documents.len()));

        let fault = state
            .batch_faults
            .pop_front()
            .or_else(|| state.persistent_fault.clone());

        match fault {
            None => {
                for document in documents {
                    state.push(document.clone());
                }
                Ok(documents.len() as u64)
            }
            Some(Fault::Partial { rejected }) => {
                let accepted = documents.len().saturating_sub(rejected);
                for document in &documents[..accepted] {
                    state.push(document.clone());
                }
                Err(Fault::Partial { rejected }.into_error(documents.len()))
            }
            Some(fault) => Err(fault.into_error(documents.len())),
        }
    }

    async fn insert_one(&self, document: &Document) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.single_insert_calls += 1;

        if state.single_insert_failures > 0 {
            state.single_insert_failures -= 1;
            return Err(StoreError::Database("document rejected".to_string()));
        }

        state.push(document.clone());
        Ok(())
    }

    async fn first_ids(&self, limit: i64) -> Result<Vec<Bson>, StoreError> {
        let state = self.lock();
        let limit = usize::try_from(limit).unwrap_or(0);

        Ok(state
            .documents
            .iter()
            .take(limit)
            .filter_map(|document| document.get("_id").cloned())
            .collect())
    }

    async fn delete_ids(&self, ids: &[Bson]) -> Result<u64, StoreError> {
        let mut state = self.lock();
        state.delete_calls += 1;

        if state.delete_failures > 0 {
            state.delete_failures -= 1;
            return Err(StoreError::RateLimited("TooManyRequests".to_string()));
        }

        let before = state.documents.len();
        state
            .documents
            .retain(|document| !document.get("_id").is_some_and(|id| ids.contains(id)));

        Ok((before - state.documents.len()) as u64)
    }

    async fn find_all(&self) -> Result<Vec<Document>, StoreError> {
        let state = self.lock();
        if state.find_fails {
            return Err(StoreError::Database("find unavailable".to_string()));
        }

        Ok(state
            .documents
            .iter()
            .cloned()
            .map(|mut document| {
                document.remove("_id");
                document
            })
            .collect())
    }

    async fn find_one(&self) -> Result<Option<Document>, StoreError> {
        Ok(self.lock().documents.first().cloned())
    }

    async fn aggregate(&self, _pipeline: Vec<Document>) -> Result<Vec<Document>, StoreError> {
        let state = self.lock();
        if state.find_fails {
            return Err(StoreError::Database("aggregate unavailable".to_string()));
        }

        if state.documents.is_empty() {
            return Ok(Vec::new());
        }

        Ok(state.aggregate_rows.clone())
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<HashMap<String, MemoryCollection>>>,
    drop_calls: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drop_calls(&self) -> usize {
        *self.drop_calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    type Collection = MemoryCollection;

    fn collection(&self, name: &str) -> MemoryCollection {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert_with(|| MemoryCollection::new(name))
            .clone()
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, StoreError> {
        let collections = self.collections.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = collections
            .iter()
            .filter(|(_, collection)| !collection.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();

        Ok(names)
    }

    async fn drop_database(&self) -> Result<(), StoreError> {
        *self.drop_calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        Ok(())
    }
}
