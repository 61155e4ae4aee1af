use std::{future::Future, sync::Arc, time::Duration};

use records::{
    CUSTOMERS, ORDERS, PRODUCTS, REVIEWS,
    error::StoreError,
    models::{Customer, Order, Product, Review},
    store::{DocumentStore, load_all},
};
use tracing::{error, info};

use crate::{
    cache::{QueryCache, QueryKey, TtlSlot},
    pages::Loaded,
    queries::{self, CategoryStats, StateSales, TopProduct},
};

pub struct AppState<S> {
    pub store: S,
    pub cache: QueryCache,
}

impl<S: DocumentStore> AppState<S> {
    pub fn new(store: S, cache_ttl: Duration) -> Arc<Self> {
        Arc::new(Self {
            store,
            cache: QueryCache::new(cache_ttl),
        })
    }

    async fn load<T, F, Fut>(&self, slot: &TtlSlot<Vec<T>>, key: QueryKey, query: F) -> Loaded<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, StoreError>>,
    {
        match slot.get_or_try_load(self.cache.ttl(), query).await {
            Ok(rows) => Loaded::ok(rows),
            Err(e) => {
                error!("Failed to load {key}: {e}");
                Loaded::failed(e.to_string())
            }
        }
    }

    pub async fn products(&self) -> Loaded<Product> {
        self.load(&self.cache.products, QueryKey::Products, || async {
            load_all(&self.store.collection(PRODUCTS)).await
        })
        .await
    }

    pub async fn customers(&self) -> Loaded<Customer> {
        self.load(&self.cache.customers, QueryKey::Customers, || async {
            load_all(&self.store.collection(CUSTOMERS)).await
        })
        .await
    }

    pub async fn orders(&self) -> Loaded<Order> {
        self.load(&self.cache.orders, QueryKey::Orders, || async {
            load_all(&self.store.collection(ORDERS)).await
        })
        .await
    }

    pub async fn reviews(&self) -> Loaded<Review> {
        self.load(&self.cache.reviews, QueryKey::Reviews, || async {
            load_all(&self.store.collection(REVIEWS)).await
        })
        .await
    }

    pub async fn category_stats(&self) -> Loaded<CategoryStats> {
        self.load(&self.cache.category_stats, QueryKey::CategoryStats, || async {
            queries::category_stats(&self.store.collection(PRODUCTS)).await
        })
        .await
    }

    pub async fn sales_by_state(&self) -> Loaded<StateSales> {
        self.load(&self.cache.sales_by_state, QueryKey::SalesByState, || async {
            queries::sales_by_state(&self.store.collection(ORDERS)).await
        })
        .await
    }

    pub async fn top_products(&self) -> Loaded<TopProduct> {
        self.load(&self.cache.top_products, QueryKey::TopProducts, || async {
            queries::top_products(&self.store.collection(REVIEWS)).await
        })
        .await
    }

    pub async fn refresh(&self, key: Option<QueryKey>) {
        match key {
            Some(key) => {
                info!("Clearing cached {key}");
                self.cache.invalidate(key).await;
            }
            None => {
                info!("Clearing all cached queries");
                self.cache.invalidate_all().await;
            }
        }
    }
}
