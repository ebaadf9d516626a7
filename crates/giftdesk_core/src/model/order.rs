//! Order record.
//!
//! Orders are read-only in the back office; they are never written by this
//! system.

use serde::{Deserialize, Serialize};

/// Fulfilment state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" | "canceled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// One purchased product inside an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_name: String,
    pub quantity: u32,
    pub unit_amount: f64,
}

impl OrderLine {
    pub fn new(product_name: impl Into<String>, quantity: u32, unit_amount: f64) -> Self {
        Self {
            product_name: product_name.into(),
            quantity,
            unit_amount,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.unit_amount * f64::from(self.quantity)
    }
}

/// Order as shown on the back-office order screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub items: Vec<OrderLine>,
    /// Sum of line totals, rounded to two decimals.
    pub total: f64,
    pub status: OrderStatus,
    /// Epoch milliseconds.
    pub placed_at: i64,
}

impl Order {
    pub fn new(
        id: impl Into<String>,
        customer_name: impl Into<String>,
        customer_email: impl Into<String>,
        items: Vec<OrderLine>,
        status: OrderStatus,
        placed_at: i64,
    ) -> Self {
        let total = items.iter().map(OrderLine::line_total).sum::<f64>();
        Self {
            id: id.into(),
            customer_name: customer_name.into(),
            customer_email: customer_email.into(),
            items,
            total: (total * 100.0).round() / 100.0,
            status,
            placed_at,
        }
    }
}
