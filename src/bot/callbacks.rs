//! Callback payload parsing.
//!
//! Payloads are colon-separated, e.g. `cart:add:17:2`. Parsing produces an
//! explicit result type; the dispatcher answers malformed payloads with a
//! generic toast and leaves conversation state untouched.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Online,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Online => "online",
            PaymentMethod::Cash => "cash",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// Quantity stepper on a product card; only edits the keyboard.
    QtyStep {
        product_id: i64,
        quantity: i64,
    },
    AddToCart {
        product_id: i64,
        quantity: i64,
    },
    ShowReviews {
        product_id: i64,
    },
    /// Opens the 1..=5 rating keyboard.
    RateProduct {
        product_id: i64,
    },
    SubmitRating {
        product_id: i64,
        rating: i64,
    },
    CartIncrease {
        item_id: i64,
    },
    CartDecrease {
        item_id: i64,
    },
    CartRemove {
        item_id: i64,
    },
    Pay {
        method: PaymentMethod,
    },
    GoToCart,
    BackToCategories,
    /// Admin-only: transition an order to a new status.
    SetOrderStatus {
        order_id: i64,
        status: OrderStatus,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "confirmed" => Some(OrderStatus::Confirmed),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParseError {
    pub data: String,
}

impl fmt::Display for CallbackParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized callback payload: '{}'", self.data)
    }
}

impl std::error::Error for CallbackParseError {}

impl CallbackAction {
    pub fn parse(data: &str) -> Result<Self, CallbackParseError> {
        let err = || CallbackParseError {
            data: data.to_string(),
        };

        let parts: Vec<&str> = data.split(':').collect();
        let action = match parts.as_slice() {
            ["qty", product_id, quantity] => CallbackAction::QtyStep {
                product_id: product_id.parse().map_err(|_| err())?,
                quantity: quantity.parse().map_err(|_| err())?,
            },
            ["cart", "add", product_id, quantity] => CallbackAction::AddToCart {
                product_id: product_id.parse().map_err(|_| err())?,
                quantity: quantity.parse().map_err(|_| err())?,
            },
            ["reviews", product_id] => CallbackAction::ShowReviews {
                product_id: product_id.parse().map_err(|_| err())?,
            },
            ["rate", product_id] => CallbackAction::RateProduct {
                product_id: product_id.parse().map_err(|_| err())?,
            },
            ["rate", product_id, rating] => {
                let rating: i64 = rating.parse().map_err(|_| err())?;
                if !(1..=5).contains(&rating) {
                    return Err(err());
                }
                CallbackAction::SubmitRating {
                    product_id: product_id.parse().map_err(|_| err())?,
                    rating,
                }
            }
            ["cartitem", "inc", item_id] => CallbackAction::CartIncrease {
                item_id: item_id.parse().map_err(|_| err())?,
            },
            ["cartitem", "dec", item_id] => CallbackAction::CartDecrease {
                item_id: item_id.parse().map_err(|_| err())?,
            },
            ["cartitem", "del", item_id] => CallbackAction::CartRemove {
                item_id: item_id.parse().map_err(|_| err())?,
            },
            ["pay", "online"] => CallbackAction::Pay {
                method: PaymentMethod::Online,
            },
            ["pay", "cash"] => CallbackAction::Pay {
                method: PaymentMethod::Cash,
            },
            ["nav", "cart"] => CallbackAction::GoToCart,
            ["nav", "categories"] => CallbackAction::BackToCategories,
            ["astatus", order_id, status] => CallbackAction::SetOrderStatus {
                order_id: order_id.parse().map_err(|_| err())?,
                status: OrderStatus::parse(status).ok_or_else(err)?,
            },
            _ => return Err(err()),
        };

        Ok(action)
    }
}
