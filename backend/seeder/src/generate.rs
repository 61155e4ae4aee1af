use chrono::{Duration, NaiveDateTime};
use rand::{Rng, seq::SliceRandom};
use records::models::{
    Brand, Category, Customer, LineItem, LoyaltyTier, Order, OrderStatus, PaymentMethod, Product,
    Review, customer_id, order_id, product_id, review_id,
};

pub const LOCATIONS: [(&str, &str); 10] = [
    ("New York", "NY"),
    ("Los Angeles", "CA"),
    ("Chicago", "IL"),
    ("Houston", "TX"),
    ("Phoenix", "AZ"),
    ("Philadelphia", "PA"),
    ("San Antonio", "TX"),
    ("San Diego", "CA"),
    ("Dallas", "TX"),
    ("San Jose", "CA"),
];

// Completed is three times as likely as the others.
const STATUSES: [OrderStatus; 5] = [
    OrderStatus::Completed,
    OrderStatus::Completed,
    OrderStatus::Completed,
    OrderStatus::Pending,
    OrderStatus::Shipped,
];

pub const TAX_RATE: f64 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub products: usize,
    pub customers: usize,
    pub orders: usize,
    pub reviews: usize,
}

impl Counts {
    pub fn for_min_docs(min_docs: usize) -> Self {
        Self {
            products: min_docs.max(25),
            customers: min_docs.max(25),
            orders: min_docs.max(30),
            reviews: min_docs.max(25),
        }
    }
}

pub struct Dataset {
    pub products: Vec<Product>,
    pub customers: Vec<Customer>,
    pub orders: Vec<Order>,
    pub reviews: Vec<Review>,
}

impl Dataset {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, now: NaiveDateTime, counts: Counts) -> Self {
        let products = products(rng, now, counts.products);
        let customers = customers(rng, now, counts.customers);
        let orders = orders(rng, now, &customers, &products, counts.orders);
        let reviews = reviews(rng, &orders, counts.reviews);

        Self {
            products,
            customers,
            orders,
            reviews,
        }
    }

    pub fn len(&self) -> usize {
        self.products.len() + self.customers.len() + self.orders.len() + self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, options: &[T]) -> T {
    options[rng.gen_range(0..options.len())]
}

fn days_before<R: Rng + ?Sized>(rng: &mut R, now: NaiveDateTime, min: i64, max: i64) -> NaiveDateTime {
    now - Duration::days(rng.gen_range(min..=max))
}

pub fn products<R: Rng + ?Sized>(rng: &mut R, now: NaiveDateTime, n: usize) -> Vec<Product> {
    (1..=n)
        .map(|i| {
            let category = pick(rng, Category::ALL);
            let id = product_id(i);

            Product {
                id: id.clone(),
                product_id: id,
                name: format!("{category} Product {i}"),
                category,
                brand: pick(rng, Brand::ALL),
                price: round_to(rng.gen_range(10.0..=500.0), 2),
                cost: round_to(rng.gen_range(5.0..=250.0), 2),
                stock_quantity: rng.gen_range(0..=500),
                rating: round_to(rng.gen_range(3.0..=5.0), 1),
                num_reviews: rng.gen_range(0..=200),
                created_date: days_before(rng, now, 30, 365),
            }
        })
        .collect()
}

pub fn customers<R: Rng + ?Sized>(rng: &mut R, now: NaiveDateTime, n: usize) -> Vec<Customer> {
    (1..=n)
        .map(|i| {
            let (city, state) = pick(rng, &LOCATIONS);
            let id = customer_id(i);

            Customer {
                id: id.clone(),
                customer_id: id,
                name: format!("Customer {i}"),
                email: format!("customer{i}@email.com"),
                city: city.to_string(),
                state: state.to_string(),
                join_date: days_before(rng, now, 1, 730),
                loyalty_tier: pick(rng, LoyaltyTier::ALL),
                total_spent: 0.0,
                order_count: 0,
            }
        })
        .collect()
}

/// Orders only reference the customers and products passed in. Either slice being empty yields no orders.
pub fn orders<R: Rng + ?Sized>(
    rng: &mut R,
    now: NaiveDateTime,
    customers: &[Customer],
    products: &[Product],
    n: usize,
) -> Vec<Order> {
    if customers.is_empty() || products.is_empty() {
        return Vec::new();
    }

    let mut orders = Vec::with_capacity(n);

    for i in 1..=n {
        let Some(customer) = customers.choose(rng) else {
            break;
        };
        let order_date = days_before(rng, now, 0, 180);

        let num_items = rng.gen_range(1..=5);
        let mut items = Vec::with_capacity(num_items);
        let mut total_amount = 0.0;

        for _ in 0..num_items {
            let Some(product) = products.choose(rng) else {
                break;
            };
            let quantity: u32 = rng.gen_range(1..=3);
            let item_total = product.price * f64::from(quantity);
            total_amount += item_total;

            items.push(LineItem {
                product_id: product.product_id.clone(),
                product_name: product.name.clone(),
                category: product.category,
                quantity,
                unit_price: product.price,
                item_total: round_to(item_total, 2),
            });
        }

        let id = order_id(i);

        orders.push(Order {
            id: id.clone(),
            order_id: id,
            customer_id: customer.customer_id.clone(),
            customer_name: customer.name.clone(),
            customer_city: customer.city.clone(),
            customer_state: customer.state.clone(),
            order_date,
            items,
            total_amount: round_to(total_amount, 2),
            shipping_cost: round_to(rng.gen_range(5.0..=15.0), 2),
            tax: round_to(total_amount * TAX_RATE, 2),
            status: pick(rng, &STATUSES),
            payment_method: pick(rng, PaymentMethod::ALL),
        });
    }

    orders
}

/// Each review picks an order, then one of its line items. Orders without items are passed over, so
/// fewer than `n` reviews can come back.
pub fn reviews<R: Rng + ?Sized>(rng: &mut R, orders: &[Order], n: usize) -> Vec<Review> {
    let mut reviews = Vec::with_capacity(n);

    for i in 1..=n {
        let Some(order) = orders.choose(rng) else {
            break;
        };
        let Some(item) = order.items.choose(rng) else {
            continue;
        };

        let rating: u8 = rng.gen_range(1..=5);
        let id = review_id(i);

        reviews.push(Review {
            id: id.clone(),
            review_id: id,
            order_id: order.order_id.clone(),
            product_id: item.product_id.clone(),
            product_name: item.product_name.clone(),
            customer_id: order.customer_id.clone(),
            customer_name: order.customer_name.clone(),
            rating,
            review_text: Review::text_for_rating(rating).to_string(),
            review_date: order.order_date + Duration::days(rng.gen_range(1..=30)),
            helpful_votes: rng.gen_range(0..=50),
        });
    }

    reviews
}
