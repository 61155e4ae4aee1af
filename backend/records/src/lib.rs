//! # Retail Records
//!
//! Shared structures between the seeder and the dashboard.
//!
//! ## Collections
//!
//! One database (default `retail_analytics`), four collections:
//! - `products` (**Product**): catalog entries, `P0001` style ids.
//! - `customers` (**Customer**): buyers with a city/state pair and a loyalty tier, `C00001` style ids.
//! - `orders` (**Order**): 1 to 5 line items each. Customer and product fields are copied in at creation
//!   time, nothing is joined later. `O000001` style ids.
//! - `reviews` (**Review**): one line item of one order, rated 1 to 5. `R00001` style ids.
//!
//! Every document carries both `id` and its kind specific id (`product_id`, `customer_id`, ...) holding
//! the same value. The store assigns `_id` on insert.
//!
//! ## Notes
//! - Records are never updated. The only destructive operation is the seeder clearing a collection
//!   before a forced re-upload.
//!
//! - No referential integrity after generation. A review points at an order that existed when it was
//!   generated, that is all.
//!
//! - The store is reached through [`store::DocumentStore`] so the seeder and dashboard can be exercised
//!   against the in-memory store (feature `memory`) instead of a live database.

pub mod config;
pub mod error;
pub mod models;
pub mod mongo;
pub mod store;

#[cfg(any(test, feature = "memory"))]
pub mod memory;

pub use mongodb::bson;

pub const PRODUCTS: &str = "products";
pub const CUSTOMERS: &str = "customers";
pub const ORDERS: &str = "orders";
pub const REVIEWS: &str = "reviews";

pub const COLLECTIONS: [&str; 4] = [PRODUCTS, CUSTOMERS, ORDERS, REVIEWS];
