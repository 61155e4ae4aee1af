//! # Aggregations
//!
//! Server-side pipelines feeding the charts. All read-only, all tolerate an empty collection by
//! returning no rows.
//!
//! - Category stats (products): count, average price, average rating and total stock per category,
//!   largest categories first.
//! - Sales by state (orders): order count, revenue and average order value per customer state, highest
//!   revenue first.
//! - Top products (reviews): average rating and review count per product, products with fewer than
//!   [`MIN_REVIEWS`] reviews left out, best rated first then most reviewed, [`TOP_PRODUCTS_LIMIT`] rows.

use records::{
    bson::{Document, doc},
    error::StoreError,
    store::{DocumentCollection, from_documents},
};
use serde::Deserialize;

pub const MIN_REVIEWS: i32 = 2;
pub const TOP_PRODUCTS_LIMIT: i64 = 15;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryStats {
    #[serde(rename = "_id")]
    pub category: Option<String>,
    pub total_products: i64,
    pub avg_price: Option<f64>,
    pub avg_rating: Option<f64>,
    pub total_stock: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StateSales {
    #[serde(rename = "_id")]
    pub state: Option<String>,
    pub total_orders: i64,
    pub total_revenue: f64,
    pub avg_order_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopProduct {
    #[serde(rename = "_id")]
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub avg_rating: f64,
    pub review_count: i64,
}

pub fn category_stats_pipeline() -> Vec<Document> {
    vec![
        doc! {
            "$group": {
                "_id": "$category",
                "total_products": { "$sum": 1 },
                "avg_price": { "$avg": "$price" },
                "avg_rating": { "$avg": "$rating" },
                "total_stock": { "$sum": "$stock_quantity" },
            }
        },
        doc! { "$sort": { "total_products": -1 } },
    ]
}

pub fn sales_by_state_pipeline() -> Vec<Document> {
    vec![
        doc! {
            "$group": {
                "_id": "$customer_state",
                "total_orders": { "$sum": 1 },
                "total_revenue": { "$sum": "$total_amount" },
                "avg_order_value": { "$avg": "$total_amount" },
            }
        },
        doc! { "$sort": { "total_revenue": -1 } },
    ]
}

pub fn top_products_pipeline() -> Vec<Document> {
    vec![
        doc! {
            "$group": {
                "_id": "$product_id",
                "product_name": { "$first": "$product_name" },
                "avg_rating": { "$avg": "$rating" },
                "review_count": { "$sum": 1 },
            }
        },
        doc! { "$match": { "review_count": { "$gte": MIN_REVIEWS } } },
        doc! { "$sort": { "avg_rating": -1, "review_count": -1 } },
        doc! { "$limit": TOP_PRODUCTS_LIMIT },
    ]
}

pub async fn category_stats<C>(products: &C) -> Result<Vec<CategoryStats>, StoreError>
where
    C: DocumentCollection + ?Sized,
{
    from_documents(products.aggregate(category_stats_pipeline()).await?)
}

pub async fn sales_by_state<C>(orders: &C) -> Result<Vec<StateSales>, StoreError>
where
    C: DocumentCollection + ?Sized,
{
    from_documents(orders.aggregate(sales_by_state_pipeline()).await?)
}

pub async fn top_products<C>(reviews: &C) -> Result<Vec<TopProduct>, StoreError>
where
    C: DocumentCollection + ?Sized,
{
    from_documents(reviews.aggregate(top_products_pipeline()).await?)
}

#[cfg(test)]
mod tests {
    use records::memory::MemoryCollection;

    use super::*;

    fn stage_names(pipeline: &[Document]) -> Vec<&str> {
        pipeline
            .iter()
            .filter_map(|stage| stage.keys().next().map(String::as_str))
            .collect()
    }

    #[test]
    fn test_pipeline_shapes() {
        assert_eq!(stage_names(&category_stats_pipeline()), vec!["$group", "$sort"]);
        assert_eq!(stage_names(&sales_by_state_pipeline()), vec!["$group", "$sort"]);
        assert_eq!(
            stage_names(&top_products_pipeline()),
            vec!["$group", "$match", "$sort", "$limit"]
        );
    }

    #[test]
    fn test_top_products_sort_order() {
        let pipeline = top_products_pipeline();
        let sort = pipeline[2].get_document("$sort").unwrap();

        let keys: Vec<&String> = sort.keys().collect();
        assert_eq!(keys, vec!["avg_rating", "review_count"]);
        assert_eq!(pipeline[3].get_i64("$limit").unwrap(), 15);
    }

    #[tokio::test]
    async fn test_empty_collections_yield_no_rows() {
        let empty = MemoryCollection::new("empty");
        empty.set_aggregate_rows(vec![doc! {
            "_id": "TX",
            "total_orders": 3,
            "total_revenue": 120.0,
            "avg_order_value": 40.0,
        }]);

        assert!(category_stats(&empty).await.unwrap().is_empty());
        assert!(sales_by_state(&empty).await.unwrap().is_empty());
        assert!(top_products(&empty).await.unwrap().is_empty());

        empty.seed([doc! { "id": "O000001", "customer_state": "TX" }]);
        assert_eq!(sales_by_state(&empty).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rows_decode() {
        let products = MemoryCollection::new("products");
        products.seed([doc! { "id": "P0001", "category": "Books" }]);
        products.set_aggregate_rows(vec![doc! {
            "_id": "Books",
            "total_products": 4,
            "avg_price": 102.5,
            "avg_rating": 4.1,
            "total_stock": 900_i64,
        }]);

        let rows = category_stats(&products).await.unwrap();

        assert_eq!(
            rows,
            vec![CategoryStats {
                category: Some("Books".to_string()),
                total_products: 4,
                avg_price: Some(102.5),
                avg_rating: Some(4.1),
                total_stock: 900,
            }]
        );
    }

    #[tokio::test]
    async fn test_null_group_key_decodes() {
        let reviews = MemoryCollection::new("reviews");
        reviews.seed([doc! { "id": "R00001", "rating": 3 }, doc! { "id": "R00002", "rating": 3 }]);
        reviews.set_aggregate_rows(vec![doc! {
            "_id": null,
            "product_name": null,
            "avg_rating": 3.0,
            "review_count": 2,
        }]);

        let rows = top_products(&reviews).await.unwrap();

        assert_eq!(rows[0].product_id, None);
        assert_eq!(rows[0].review_count, 2);
    }

    #[tokio::test]
    async fn test_store_errors_surface() {
        let orders = MemoryCollection::new("orders");
        orders.fail_finds();

        assert!(sales_by_state(&orders).await.is_err());
    }
}
