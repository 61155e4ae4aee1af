//! # Pages
//!
//! Six views, picked from the sidebar. Each builds a [`View`], a flat list of [`Block`]s, from data that
//! was already loaded. Rendering to HTML lives in [`crate::html`].
//!
//! ## Degrading
//! - A failed query shows up as an [`Block::Error`] with the message, its data as empty.
//! - A page missing its primary data shows a [`Block::Warning`] and nothing else.
//! - Overview needs all four collections.

use std::{fmt, str::FromStr, sync::Arc};

use records::models::{Customer, Order, OrderStatus, Product, Review};

use crate::{
    analytics::{Bin, distinct, format_count, format_money, histogram, mean, value_counts},
    queries::{CategoryStats, StateSales, TopProduct},
};

pub const TOP_N: usize = 10;
const PRICE_BINS: usize = 30;
const ORDER_VALUE_BINS: usize = 30;
const HELPFUL_VOTE_BINS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    About,
    Overview,
    Products,
    Customers,
    Orders,
    Reviews,
}

impl Page {
    pub const ALL: [Page; 6] = [
        Page::About,
        Page::Overview,
        Page::Products,
        Page::Customers,
        Page::Orders,
        Page::Reviews,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::About => "About",
            Page::Overview => "Overview",
            Page::Products => "Products",
            Page::Customers => "Customers",
            Page::Orders => "Orders",
            Page::Reviews => "Reviews",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Page::About => "about",
            Page::Overview => "overview",
            Page::Products => "products",
            Page::Customers => "customers",
            Page::Orders => "orders",
            Page::Reviews => "reviews",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Page::ALL
            .into_iter()
            .find(|page| page.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| s.to_string())
    }
}

/// Query result as handed to a page. A failed query becomes empty rows plus the error message.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub rows: Arc<Vec<T>>,
    pub error: Option<String>,
}

impl<T> Loaded<T> {
    pub fn ok(rows: Arc<Vec<T>>) -> Self {
        Self { rows, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            rows: Arc::new(Vec::new()),
            error: Some(error.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(String),
    Prose(&'static str),
    Metrics(Vec<Metric>),
    Divider,
    Bars {
        title: String,
        bars: Vec<(String, f64)>,
    },
    Shares {
        title: String,
        slices: Vec<(String, f64)>,
    },
    Histogram {
        title: String,
        axis: &'static str,
        bins: Vec<Bin>,
    },
    Table {
        title: String,
        columns: Vec<&'static str>,
        rows: Vec<Vec<String>>,
    },
    Warning(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub page: Page,
    pub header: &'static str,
    pub blocks: Vec<Block>,
}

impl View {
    fn new(page: Page, header: &'static str) -> Self {
        Self {
            page,
            header,
            blocks: Vec::new(),
        }
    }

    fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    fn errors<T>(&mut self, name: &str, loaded: &Loaded<T>) {
        if let Some(error) = &loaded.error {
            self.push(Block::Error(format!("Error loading {name}: {error}")));
        }
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|block| match block {
            Block::Warning(message) => Some(message.as_str()),
            _ => None,
        })
    }
}

fn metric(label: &'static str, value: impl Into<String>) -> Metric {
    Metric {
        label,
        value: value.into(),
    }
}

fn count_bars<K: fmt::Display>(counts: Vec<(K, usize)>) -> Vec<(String, f64)> {
    counts
        .into_iter()
        .map(|(key, count)| (key.to_string(), count as f64))
        .collect()
}

fn label(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "(none)".to_string())
}

fn state_revenue_bars(sales: &[StateSales]) -> Vec<(String, f64)> {
    sales
        .iter()
        .take(TOP_N)
        .map(|row| (label(&row.state), row.total_revenue))
        .collect()
}

fn total_revenue(orders: &[Order]) -> f64 {
    orders.iter().map(|order| order.total_amount).sum()
}

const ABOUT: &str = "### Business Context

Retail managers, analysts and decision makers need one place to see how products perform, how customers \
behave, where sales come from and what buyers say afterwards. This dashboard reads the retail database \
directly and keeps those four views side by side.

### Analytical Value

**Products** shows which categories carry the catalog, how prices are spread and where stock piles up, \
so slow movers and reorder candidates stand out.

**Customers** shows where buyers live and how they split across loyalty tiers, which guides regional \
campaigns and retention programs.

**Orders** tracks volume, revenue by state, fulfillment status and payment preferences for forecasting \
and logistics planning.

**Reviews** tracks ratings and helpfulness so quality problems surface early and well loved products \
get noticed.

### Data Foundation

All figures come from four collections (products, customers, orders and reviews) in a managed document \
database. Results are cached for a few minutes; use refresh to reload them immediately.";

pub fn about() -> View {
    let mut view = View::new(Page::About, "About This Dashboard");
    view.push(Block::Prose(ABOUT));
    view
}

pub fn overview(
    products: &Loaded<Product>,
    customers: &Loaded<Customer>,
    orders: &Loaded<Order>,
    reviews: &Loaded<Review>,
    sales_by_state: &Loaded<StateSales>,
    category_stats: &Loaded<CategoryStats>,
) -> View {
    let mut view = View::new(Page::Overview, "Business Overview");
    view.errors("products", products);
    view.errors("customers", customers);
    view.errors("orders", orders);
    view.errors("reviews", reviews);

    if products.is_empty() || customers.is_empty() || orders.is_empty() || reviews.is_empty() {
        view.push(Block::Warning(
            "Some data is missing. Please check your database connection.".to_string(),
        ));
        return view;
    }

    let avg_rating = mean(reviews.rows.iter().map(|r| f64::from(r.rating))).unwrap_or_default();

    view.push(Block::Metrics(vec![
        metric("Total Products", format_count(products.rows.len() as u64)),
        metric(
            "Product Categories",
            distinct(products.rows.iter().map(|p| p.category)).to_string(),
        ),
        metric("Total Customers", format_count(customers.rows.len() as u64)),
        metric(
            "Unique States",
            distinct(customers.rows.iter().map(|c| c.state.as_str())).to_string(),
        ),
        metric("Total Orders", format_count(orders.rows.len() as u64)),
        metric("Total Revenue", format_money(total_revenue(&orders.rows))),
        metric("Total Reviews", format_count(reviews.rows.len() as u64)),
        metric("Avg Rating", format!("{avg_rating:.2}⭐")),
    ]));
    view.push(Block::Divider);

    view.errors("sales by state", sales_by_state);
    if !sales_by_state.is_empty() {
        view.push(Block::Heading("Revenue by State".to_string()));
        view.push(Block::Bars {
            title: "Top 10 States by Revenue".to_string(),
            bars: state_revenue_bars(&sales_by_state.rows),
        });
    }

    view.errors("category stats", category_stats);
    if !category_stats.is_empty() {
        view.push(Block::Heading("Product Categories".to_string()));
        view.push(Block::Shares {
            title: "Products by Category".to_string(),
            slices: category_stats
                .rows
                .iter()
                .map(|row| (label(&row.category), row.total_products as f64))
                .collect(),
        });
    }

    view.push(Block::Heading("Order Status Distribution".to_string()));
    view.push(Block::Bars {
        title: "Orders by Status".to_string(),
        bars: count_bars(value_counts(orders.rows.iter().map(|o| o.status))),
    });
    view.push(Block::Shares {
        title: "Payment Methods".to_string(),
        slices: count_bars(value_counts(orders.rows.iter().map(|o| o.payment_method))),
    });

    view
}

pub fn products(products: &Loaded<Product>, category_stats: &Loaded<CategoryStats>) -> View {
    let mut view = View::new(Page::Products, "Product Analysis");
    view.errors("products", products);

    if products.is_empty() {
        view.push(Block::Warning("No product data available".to_string()));
        return view;
    }

    let rows = &products.rows;
    let avg_price = mean(rows.iter().map(|p| p.price)).unwrap_or_default();
    let avg_rating = mean(rows.iter().map(|p| p.rating)).unwrap_or_default();
    let total_stock: u64 = rows.iter().map(|p| u64::from(p.stock_quantity)).sum();

    view.push(Block::Metrics(vec![
        metric("Total Products", format_count(rows.len() as u64)),
        metric("Average Price", format_money(avg_price)),
        metric("Total Stock", format_count(total_stock)),
        metric("Avg Product Rating", format!("{avg_rating:.2}/5.0")),
    ]));
    view.push(Block::Divider);

    view.errors("category stats", category_stats);
    if !category_stats.is_empty() {
        let mut by_price: Vec<&CategoryStats> = category_stats.rows.iter().collect();
        by_price.sort_by(|a, b| b.avg_price.unwrap_or_default().total_cmp(&a.avg_price.unwrap_or_default()));

        view.push(Block::Heading("Average Price by Category".to_string()));
        view.push(Block::Bars {
            title: "Average Product Price by Category".to_string(),
            bars: by_price
                .iter()
                .map(|row| (label(&row.category), row.avg_price.unwrap_or_default()))
                .collect(),
        });

        let mut by_stock = by_price;
        by_stock.sort_by(|a, b| b.total_stock.cmp(&a.total_stock));

        view.push(Block::Heading("Stock Levels by Category".to_string()));
        view.push(Block::Bars {
            title: "Total Stock by Category".to_string(),
            bars: by_stock
                .iter()
                .map(|row| (label(&row.category), row.total_stock as f64))
                .collect(),
        });
    }

    let prices: Vec<f64> = rows.iter().map(|p| p.price).collect();
    view.push(Block::Heading("Price Distribution".to_string()));
    view.push(Block::Histogram {
        title: "Distribution of Product Prices".to_string(),
        axis: "Price ($)",
        bins: histogram(&prices, PRICE_BINS),
    });

    let mut catalog: Vec<&Product> = rows.iter().collect();
    catalog.sort_by(|a, b| b.price.total_cmp(&a.price));

    view.push(Block::Table {
        title: "Product Catalog".to_string(),
        columns: vec!["product_id", "name", "category", "brand", "price", "stock_quantity", "rating"],
        rows: catalog
            .iter()
            .map(|p| {
                vec![
                    p.product_id.clone(),
                    p.name.clone(),
                    p.category.to_string(),
                    p.brand.to_string(),
                    format!("{:.2}", p.price),
                    p.stock_quantity.to_string(),
                    format!("{:.1}", p.rating),
                ]
            })
            .collect(),
    });

    view
}

pub fn customers(customers: &Loaded<Customer>) -> View {
    let mut view = View::new(Page::Customers, "Customer Analysis");
    view.errors("customers", customers);

    if customers.is_empty() {
        view.push(Block::Warning("No customer data available".to_string()));
        return view;
    }

    let rows = &customers.rows;
    let tiers = value_counts(rows.iter().map(|c| c.loyalty_tier));
    let top_tier = tiers
        .first()
        .map(|(tier, _)| tier.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    view.push(Block::Metrics(vec![
        metric("Total Customers", format_count(rows.len() as u64)),
        metric("Unique Cities", distinct(rows.iter().map(|c| c.city.as_str())).to_string()),
        metric("Unique States", distinct(rows.iter().map(|c| c.state.as_str())).to_string()),
        metric("Top Loyalty Tier", top_tier),
    ]));
    view.push(Block::Divider);

    let mut states = value_counts(rows.iter().map(|c| c.state.as_str()));
    states.truncate(TOP_N);
    view.push(Block::Heading("Customers by State".to_string()));
    view.push(Block::Bars {
        title: "Top 10 States by Customer Count".to_string(),
        bars: count_bars(states),
    });

    view.push(Block::Heading("Loyalty Tier Distribution".to_string()));
    view.push(Block::Shares {
        title: "Customer Loyalty Tiers".to_string(),
        slices: count_bars(tiers),
    });

    let mut cities = value_counts(rows.iter().map(|c| c.city.as_str()));
    cities.truncate(TOP_N);
    view.push(Block::Heading("Top Cities by Customer Count".to_string()));
    view.push(Block::Bars {
        title: "Top 10 Cities".to_string(),
        bars: count_bars(cities),
    });

    view.push(Block::Table {
        title: "Customer Directory".to_string(),
        columns: vec!["customer_id", "name", "email", "city", "state", "loyalty_tier"],
        rows: rows
            .iter()
            .map(|c| {
                vec![
                    c.customer_id.clone(),
                    c.name.clone(),
                    c.email.clone(),
                    c.city.clone(),
                    c.state.clone(),
                    c.loyalty_tier.to_string(),
                ]
            })
            .collect(),
    });

    view
}

pub fn orders(orders: &Loaded<Order>, sales_by_state: &Loaded<StateSales>) -> View {
    let mut view = View::new(Page::Orders, "Orders Analysis");
    view.errors("orders", orders);

    if orders.is_empty() {
        view.push(Block::Warning("No order data available".to_string()));
        return view;
    }

    let rows = &orders.rows;
    let revenue = total_revenue(rows);
    let completed = rows
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .count();

    view.push(Block::Metrics(vec![
        metric("Total Orders", format_count(rows.len() as u64)),
        metric("Total Revenue", format_money(revenue)),
        metric("Avg Order Value", format_money(revenue / rows.len() as f64)),
        metric("Completed Orders", format_count(completed as u64)),
    ]));
    view.push(Block::Divider);

    view.errors("sales by state", sales_by_state);
    if !sales_by_state.is_empty() {
        view.push(Block::Heading("Revenue by State".to_string()));
        view.push(Block::Bars {
            title: "Top 10 States by Revenue".to_string(),
            bars: state_revenue_bars(&sales_by_state.rows),
        });
    }

    view.push(Block::Heading("Order Status Breakdown".to_string()));
    view.push(Block::Shares {
        title: "Orders by Status".to_string(),
        slices: count_bars(value_counts(rows.iter().map(|o| o.status))),
    });

    let totals: Vec<f64> = rows.iter().map(|o| o.total_amount).collect();
    view.push(Block::Heading("Order Value Distribution".to_string()));
    view.push(Block::Histogram {
        title: "Distribution of Order Values".to_string(),
        axis: "Order Amount ($)",
        bins: histogram(&totals, ORDER_VALUE_BINS),
    });

    let mut recent: Vec<&Order> = rows.iter().collect();
    recent.sort_by(|a, b| b.order_id.cmp(&a.order_id));

    view.push(Block::Table {
        title: "Recent Orders".to_string(),
        columns: vec![
            "order_id",
            "customer_name",
            "customer_state",
            "total_amount",
            "status",
            "payment_method",
        ],
        rows: recent
            .iter()
            .map(|o| {
                vec![
                    o.order_id.clone(),
                    o.customer_name.clone(),
                    o.customer_state.clone(),
                    format!("{:.2}", o.total_amount),
                    o.status.to_string(),
                    o.payment_method.to_string(),
                ]
            })
            .collect(),
    });

    view
}

pub fn reviews(reviews: &Loaded<Review>, top_products: &Loaded<TopProduct>) -> View {
    let mut view = View::new(Page::Reviews, "Reviews Analysis");
    view.errors("reviews", reviews);

    if reviews.is_empty() {
        view.push(Block::Warning("No review data available".to_string()));
        return view;
    }

    let rows = &reviews.rows;
    let avg_rating = mean(rows.iter().map(|r| f64::from(r.rating))).unwrap_or_default();
    let positive = rows.iter().filter(|r| r.rating >= 4).count();
    let avg_helpful = mean(rows.iter().map(|r| f64::from(r.helpful_votes))).unwrap_or_default();

    view.push(Block::Metrics(vec![
        metric("Total Reviews", format_count(rows.len() as u64)),
        metric("Average Rating", format!("{avg_rating:.2}⭐")),
        metric("Positive Reviews", format_count(positive as u64)),
        metric("Avg Helpful Votes", format!("{avg_helpful:.1}")),
    ]));
    view.push(Block::Divider);

    let mut ratings = value_counts(rows.iter().map(|r| r.rating));
    ratings.sort_by_key(|(rating, _)| *rating);
    view.push(Block::Heading("Rating Distribution".to_string()));
    view.push(Block::Bars {
        title: "Reviews by Rating".to_string(),
        bars: count_bars(ratings),
    });

    view.errors("top products", top_products);
    if !top_products.is_empty() {
        view.push(Block::Heading("Top Rated Products".to_string()));
        view.push(Block::Bars {
            title: "Top 10 Products by Rating".to_string(),
            bars: top_products
                .rows
                .iter()
                .take(TOP_N)
                .map(|row| {
                    let name = row.product_name.clone().or_else(|| row.product_id.clone());
                    (
                        format!("{} ({} reviews)", label(&name), row.review_count),
                        row.avg_rating,
                    )
                })
                .collect(),
        });
    }

    let votes: Vec<f64> = rows.iter().map(|r| f64::from(r.helpful_votes)).collect();
    view.push(Block::Heading("Review Helpfulness".to_string()));
    view.push(Block::Histogram {
        title: "Distribution of Helpful Votes".to_string(),
        axis: "Helpful Votes",
        bins: histogram(&votes, HELPFUL_VOTE_BINS),
    });

    let mut recent: Vec<&Review> = rows.iter().collect();
    recent.sort_by(|a, b| b.review_id.cmp(&a.review_id));

    view.push(Block::Table {
        title: "Recent Reviews".to_string(),
        columns: vec![
            "review_id",
            "product_name",
            "customer_name",
            "rating",
            "review_text",
            "helpful_votes",
        ],
        rows: recent
            .iter()
            .map(|r| {
                vec![
                    r.review_id.clone(),
                    r.product_name.clone(),
                    r.customer_name.clone(),
                    r.rating.to_string(),
                    r.review_text.clone(),
                    r.helpful_votes.to_string(),
                ]
            })
            .collect(),
    });

    view
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use records::models::{
        Brand, Category, LineItem, LoyaltyTier, PaymentMethod, customer_id, order_id, product_id,
        review_id,
    };

    use super::*;

    fn date() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn product(n: usize, price: f64) -> Product {
        Product {
            id: product_id(n),
            product_id: product_id(n),
            name: format!("Books Product {n}"),
            category: Category::Books,
            brand: Brand::A,
            price,
            cost: 5.0,
            stock_quantity: 10,
            rating: 4.0,
            num_reviews: 3,
            created_date: date(),
        }
    }

    fn customer(n: usize, state: &str) -> Customer {
        Customer {
            id: customer_id(n),
            customer_id: customer_id(n),
            name: format!("Customer {n}"),
            email: format!("customer{n}@email.com"),
            city: "Dallas".to_string(),
            state: state.to_string(),
            join_date: date(),
            loyalty_tier: LoyaltyTier::Gold,
            total_spent: 0.0,
            order_count: 0,
        }
    }

    fn order(n: usize, total: f64, status: OrderStatus) -> Order {
        Order {
            id: order_id(n),
            order_id: order_id(n),
            customer_id: customer_id(1),
            customer_name: "Customer 1".to_string(),
            customer_city: "Dallas".to_string(),
            customer_state: "TX".to_string(),
            order_date: date(),
            items: vec![LineItem {
                product_id: product_id(1),
                product_name: "Books Product 1".to_string(),
                category: Category::Books,
                quantity: 1,
                unit_price: total,
                item_total: total,
            }],
            total_amount: total,
            shipping_cost: 5.0,
            tax: total * 0.08,
            status,
            payment_method: PaymentMethod::Cash,
        }
    }

    fn review(n: usize, rating: u8) -> Review {
        Review {
            id: review_id(n),
            review_id: review_id(n),
            order_id: order_id(1),
            product_id: product_id(1),
            product_name: "Books Product 1".to_string(),
            customer_id: customer_id(1),
            customer_name: "Customer 1".to_string(),
            rating,
            review_text: Review::text_for_rating(rating).to_string(),
            review_date: date(),
            helpful_votes: 4,
        }
    }

    fn loaded<T>(rows: Vec<T>) -> Loaded<T> {
        Loaded::ok(Arc::new(rows))
    }

    fn empty<T>() -> Loaded<T> {
        loaded(Vec::new())
    }

    fn metric_value(view: &View, label: &str) -> Option<String> {
        view.blocks.iter().find_map(|block| match block {
            Block::Metrics(metrics) => metrics
                .iter()
                .find(|m| m.label == label)
                .map(|m| m.value.clone()),
            _ => None,
        })
    }

    #[test]
    fn test_page_slugs() {
        for page in Page::ALL {
            assert_eq!(page.slug().parse::<Page>(), Ok(page));
        }
        assert_eq!("Reviews".parse::<Page>(), Ok(Page::Reviews));
        assert!("settings".parse::<Page>().is_err());
    }

    #[test]
    fn test_overview_needs_every_collection() {
        let view = overview(
            &loaded(vec![product(1, 10.0)]),
            &loaded(vec![customer(1, "TX")]),
            &loaded(vec![order(1, 10.0, OrderStatus::Completed)]),
            &empty(),
            &empty(),
            &empty(),
        );

        assert_eq!(
            view.warnings().collect::<Vec<_>>(),
            vec!["Some data is missing. Please check your database connection."]
        );
        assert_eq!(view.blocks.len(), 1);
    }

    #[test]
    fn test_overview_metrics() {
        let view = overview(
            &loaded(vec![product(1, 10.0), product(2, 20.0)]),
            &loaded(vec![customer(1, "TX"), customer(2, "CA"), customer(3, "TX")]),
            &loaded(vec![
                order(1, 1000.0, OrderStatus::Completed),
                order(2, 234.5, OrderStatus::Pending),
            ]),
            &loaded(vec![review(1, 5), review(2, 4)]),
            &empty(),
            &empty(),
        );

        assert_eq!(metric_value(&view, "Total Revenue").unwrap(), "$1,234.50");
        assert_eq!(metric_value(&view, "Unique States").unwrap(), "2");
        assert_eq!(metric_value(&view, "Product Categories").unwrap(), "1");
        assert_eq!(metric_value(&view, "Avg Rating").unwrap(), "4.50⭐");
    }

    #[test]
    fn test_query_errors_are_inline() {
        let view = products(&Loaded::failed("connection refused"), &empty());

        assert!(matches!(&view.blocks[0], Block::Error(message) if message.contains("connection refused")));
        assert_eq!(view.warnings().collect::<Vec<_>>(), vec!["No product data available"]);
    }

    #[test]
    fn test_products_catalog_sorted_by_price() {
        let view = products(
            &loaded(vec![product(1, 15.0), product(2, 300.0), product(3, 42.0)]),
            &empty(),
        );

        let table = view
            .blocks
            .iter()
            .find_map(|block| match block {
                Block::Table { rows, .. } => Some(rows),
                _ => None,
            })
            .unwrap();
        let ids: Vec<&str> = table.iter().map(|row| row[0].as_str()).collect();

        assert_eq!(ids, vec!["P0002", "P0003", "P0001"]);
        assert_eq!(metric_value(&view, "Total Stock").unwrap(), "30");
    }

    #[test]
    fn test_orders_metrics() {
        let view = orders(
            &loaded(vec![
                order(1, 100.0, OrderStatus::Completed),
                order(2, 50.0, OrderStatus::Shipped),
                order(3, 30.0, OrderStatus::Completed),
            ]),
            &empty(),
        );

        assert_eq!(metric_value(&view, "Completed Orders").unwrap(), "2");
        assert_eq!(metric_value(&view, "Avg Order Value").unwrap(), "$60.00");
    }

    #[test]
    fn test_reviews_rating_distribution_in_rating_order() {
        let view = reviews(
            &loaded(vec![review(1, 5), review(2, 1), review(3, 5), review(4, 3)]),
            &empty(),
        );

        let bars = view
            .blocks
            .iter()
            .find_map(|block| match block {
                Block::Bars { title, bars } if title == "Reviews by Rating" => Some(bars.clone()),
                _ => None,
            })
            .unwrap();

        assert_eq!(
            bars,
            vec![
                ("1".to_string(), 1.0),
                ("3".to_string(), 1.0),
                ("5".to_string(), 2.0)
            ]
        );
        assert_eq!(metric_value(&view, "Positive Reviews").unwrap(), "2");
    }

    #[test]
    fn test_customers_top_tier() {
        let view = customers(&loaded(vec![customer(1, "TX"), customer(2, "NY")]));

        assert_eq!(metric_value(&view, "Top Loyalty Tier").unwrap(), "Gold");
        assert_eq!(metric_value(&view, "Unique Cities").unwrap(), "1");
    }

    #[test]
    fn test_empty_pages_warn() {
        assert_eq!(customers(&empty()).warnings().count(), 1);
        assert_eq!(orders(&empty(), &empty()).warnings().count(), 1);
        assert_eq!(reviews(&empty(), &empty()).warnings().count(), 1);
        assert_eq!(about().warnings().count(), 0);
    }
}
