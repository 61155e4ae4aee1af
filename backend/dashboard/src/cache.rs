//! # Query Cache
//!
//! Read-through cache in front of the store, one slot per query.
//!
//! - Keyed by [`QueryKey`], so every cached result has a name that can be invalidated on its own.
//! - Fixed TTL for every slot (`CACHE_TTL_SECS`, 5 minutes by default). An expired slot is reloaded by
//!   the next reader.
//! - Only successful loads are stored. A failed query is retried on the next request instead of serving an
//!   empty result for the rest of the TTL.
//! - Two requests racing on an expired slot may both hit the store. Acceptable, results are read-only.

use std::{fmt, future::Future, str::FromStr, sync::Arc, time::Duration};

use records::models::{Customer, Order, Product, Review};
use tokio::{sync::RwLock, time::Instant};

use crate::queries::{CategoryStats, StateSales, TopProduct};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Products,
    Customers,
    Orders,
    Reviews,
    CategoryStats,
    SalesByState,
    TopProducts,
}

impl QueryKey {
    pub const ALL: [QueryKey; 7] = [
        QueryKey::Products,
        QueryKey::Customers,
        QueryKey::Orders,
        QueryKey::Reviews,
        QueryKey::CategoryStats,
        QueryKey::SalesByState,
        QueryKey::TopProducts,
    ];

    pub fn name(self) -> &'static str {
        match self {
            QueryKey::Products => "products",
            QueryKey::Customers => "customers",
            QueryKey::Orders => "orders",
            QueryKey::Reviews => "reviews",
            QueryKey::CategoryStats => "category_stats",
            QueryKey::SalesByState => "sales_by_state",
            QueryKey::TopProducts => "top_products",
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QueryKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueryKey::ALL
            .into_iter()
            .find(|key| key.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| s.to_string())
    }
}

struct Entry<T> {
    value: Arc<T>,
    loaded_at: Instant,
}

pub struct TtlSlot<T> {
    entry: RwLock<Option<Entry<T>>>,
}

impl<T> Default for TtlSlot<T> {
    fn default() -> Self {
        Self {
            entry: RwLock::new(None),
        }
    }
}

impl<T> TtlSlot<T> {
    pub async fn get(&self, ttl: Duration) -> Option<Arc<T>> {
        self.entry
            .read()
            .await
            .as_ref()
            .filter(|entry| entry.loaded_at.elapsed() < ttl)
            .map(|entry| entry.value.clone())
    }

    pub async fn put(&self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        *self.entry.write().await = Some(Entry {
            value: value.clone(),
            loaded_at: Instant::now(),
        });

        value
    }

    pub async fn clear(&self) {
        *self.entry.write().await = None;
    }

    pub async fn get_or_try_load<F, Fut, E>(&self, ttl: Duration, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(ttl).await {
            return Ok(value);
        }

        let value = load().await?;
        Ok(self.put(value).await)
    }
}

pub struct QueryCache {
    ttl: Duration,
    pub products: TtlSlot<Vec<Product>>,
    pub customers: TtlSlot<Vec<Customer>>,
    pub orders: TtlSlot<Vec<Order>>,
    pub reviews: TtlSlot<Vec<Review>>,
    pub category_stats: TtlSlot<Vec<CategoryStats>>,
    pub sales_by_state: TtlSlot<Vec<StateSales>>,
    pub top_products: TtlSlot<Vec<TopProduct>>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            products: TtlSlot::default(),
            customers: TtlSlot::default(),
            orders: TtlSlot::default(),
            reviews: TtlSlot::default(),
            category_stats: TtlSlot::default(),
            sales_by_state: TtlSlot::default(),
            top_products: TtlSlot::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn invalidate(&self, key: QueryKey) {
        match key {
            QueryKey::Products => self.products.clear().await,
            QueryKey::Customers => self.customers.clear().await,
            QueryKey::Orders => self.orders.clear().await,
            QueryKey::Reviews => self.reviews.clear().await,
            QueryKey::CategoryStats => self.category_stats.clear().await,
            QueryKey::SalesByState => self.sales_by_state.clear().await,
            QueryKey::TopProducts => self.top_products.clear().await,
        }
    }

    pub async fn invalidate_all(&self) {
        for key in QueryKey::ALL {
            self.invalidate(key).await;
        }
    }
}
