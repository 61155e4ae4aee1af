use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

macro_rules! labeled_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

labeled_enum!(Category {
    Electronics => "Electronics",
    Clothing => "Clothing",
    HomeAndGarden => "Home & Garden",
    Sports => "Sports",
    Books => "Books",
    Toys => "Toys",
    Beauty => "Beauty",
    Food => "Food",
});

labeled_enum!(Brand {
    A => "BrandA",
    B => "BrandB",
    C => "BrandC",
    D => "BrandD",
    E => "BrandE",
    Generic => "Generic",
});

labeled_enum!(
    /// Categorical only, nothing in the system acts on the tier.
    LoyaltyTier {
        Bronze => "Bronze",
        Silver => "Silver",
        Gold => "Gold",
        Platinum => "Platinum",
    }
);

labeled_enum!(OrderStatus {
    Completed => "Completed",
    Pending => "Pending",
    Shipped => "Shipped",
});

labeled_enum!(PaymentMethod {
    CreditCard => "Credit Card",
    DebitCard => "Debit Card",
    PayPal => "PayPal",
    Cash => "Cash",
});

/// Fixed width, 1-based sequence ids: `sequence_id('P', 4, 1) == "P0001"`.
pub fn sequence_id(prefix: char, width: usize, n: usize) -> String {
    format!("{prefix}{n:0width$}")
}

pub fn product_id(n: usize) -> String {
    sequence_id('P', 4, n)
}

pub fn customer_id(n: usize) -> String {
    sequence_id('C', 5, n)
}

pub fn order_id(n: usize) -> String {
    sequence_id('O', 6, n)
}

pub fn review_id(n: usize) -> String {
    sequence_id('R', 5, n)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub category: Category,
    pub brand: Brand,
    pub price: f64,
    pub cost: f64,
    pub stock_quantity: u32,
    pub rating: f64,
    pub num_reviews: u32,
    pub created_date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub customer_id: String,
    pub name: String,
    pub email: String,
    pub city: String,
    pub state: String,
    pub join_date: NaiveDateTime,
    pub loyalty_tier: LoyaltyTier,
    pub total_spent: f64,
    pub order_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub product_name: String,
    pub category: Category,
    pub quantity: u32,
    pub unit_price: f64,
    pub item_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub customer_city: String,
    pub customer_state: String,
    pub order_date: NaiveDateTime,
    pub items: Vec<LineItem>,
    pub total_amount: f64,
    pub shipping_cost: f64,
    pub tax: f64,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub review_id: String,
    pub order_id: String,
    pub product_id: String,
    pub product_name: String,
    pub customer_id: String,
    pub customer_name: String,
    pub rating: u8,
    pub review_text: String,
    pub review_date: NaiveDateTime,
    pub helpful_votes: u32,
}

impl Review {
    pub fn text_for_rating(rating: u8) -> &'static str {
        match rating {
            1 => "Very disappointed with this purchase. Would not recommend.",
            2 => "Below expectations. Several issues encountered.",
            3 => "Average product. Does the job but nothing special.",
            4 => "Good product. Happy with the purchase overall.",
            5 => "Excellent quality! Exceeded my expectations. Highly recommend!",
            _ => "Good product",
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use mongodb::bson::{self, doc};

    use super::*;

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap()
    }

    #[test]
    fn test_sequence_ids() {
        assert_eq!(product_id(1), "P0001");
        assert_eq!(customer_id(42), "C00042");
        assert_eq!(order_id(7), "O000007");
        assert_eq!(review_id(12345), "R12345");
    }

    #[test]
    fn test_labels_survive_serialization() {
        let product = Product {
            id: product_id(3),
            product_id: product_id(3),
            name: "Home & Garden Product 3".to_string(),
            category: Category::HomeAndGarden,
            brand: Brand::Generic,
            price: 19.99,
            cost: 7.5,
            stock_quantity: 12,
            rating: 4.2,
            num_reviews: 9,
            created_date: timestamp(),
        };

        let document = bson::to_document(&product).unwrap();
        assert_eq!(document.get_str("category").unwrap(), "Home & Garden");
        assert_eq!(document.get_str("brand").unwrap(), "Generic");

        let back: Product = bson::from_document(document).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let document = doc! {
            "id": "C00001",
            "customer_id": "C00001",
            "name": "Customer 1",
        };

        assert!(bson::from_document::<Customer>(document).is_err());
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let document = doc! {
            "product_id": "P0001",
            "product_name": "Toys Product 1",
            "category": "Garden Gnomes",
            "quantity": 1,
            "unit_price": 10.0,
            "item_total": 10.0,
        };

        assert!(bson::from_document::<LineItem>(document).is_err());
    }

    #[test]
    fn test_review_text() {
        assert_eq!(
            Review::text_for_rating(5),
            "Excellent quality! Exceeded my expectations. Highly recommend!"
        );
        assert_eq!(Review::text_for_rating(0), "Good product");
    }

    #[test]
    fn test_display_matches_stored_label() {
        assert_eq!(PaymentMethod::CreditCard.to_string(), "Credit Card");
        assert_eq!(OrderStatus::ALL.len(), 3);
        assert_eq!(Category::ALL.len(), 8);
    }
}
