//! Read-only order catalog.
//!
//! Orders are fixture data shown on the back-office order screen; nothing in
//! this system writes them.

use crate::model::order::{Order, OrderLine, OrderStatus};

/// In-memory order catalog.
#[derive(Debug, Clone, Default)]
pub struct OrderCatalog {
    orders: Vec<Order>,
}

impl OrderCatalog {
    pub fn new(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    /// Catalog preloaded with the sample orders shown on the order screen.
    pub fn sample() -> Self {
        Self::new(vec![
            Order::new(
                "ORD-1001",
                "Ananya Rao",
                "ananya.rao@example.com",
                vec![
                    OrderLine::new("Celebration Hamper", 1, 2499.0),
                    OrderLine::new("Greeting Card", 2, 99.0),
                ],
                OrderStatus::Delivered,
                1_717_200_000_000,
            ),
            Order::new(
                "ORD-1002",
                "Karan Mehta",
                "karan.mehta@example.com",
                vec![OrderLine::new("Scented Candle Set", 3, 749.0)],
                OrderStatus::Shipped,
                1_717_459_200_000,
            ),
            Order::new(
                "ORD-1003",
                "Priya Nair",
                "priya.nair@example.com",
                vec![
                    OrderLine::new("Chocolate Box", 2, 599.0),
                    OrderLine::new("Personalised Mug", 1, 449.0),
                ],
                OrderStatus::Pending,
                1_717_545_600_000,
            ),
            Order::new(
                "ORD-1004",
                "Rahul Verma",
                "rahul.verma@example.com",
                vec![OrderLine::new("Desk Plant", 1, 899.0)],
                OrderStatus::Cancelled,
                1_717_632_000_000,
            ),
        ])
    }

    /// Lists orders, most recently placed first, optionally filtered by status.
    pub fn list_orders(&self, status: Option<OrderStatus>) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|order| status.map_or(true, |status| order.status == status))
            .cloned()
            .collect();
        orders.sort_by(|left, right| {
            right
                .placed_at
                .cmp(&left.placed_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        orders
    }

    pub fn get_order(&self, id: &str) -> Option<Order> {
        self.orders
            .iter()
            .find(|order| order.id.eq_ignore_ascii_case(id.trim()))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::OrderCatalog;
    use crate::model::order::OrderStatus;

    #[test]
    fn list_orders_is_newest_first_and_filterable() {
        let catalog = OrderCatalog::sample();

        let all = catalog.list_orders(None);
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].id, "ORD-1004");

        let pending = catalog.list_orders(Some(OrderStatus::Pending));
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "ORD-1003");
    }

    #[test]
    fn get_order_matches_case_insensitively() {
        let catalog = OrderCatalog::sample();
        let order = catalog.get_order("ord-1002").expect("order should exist");
        assert_eq!(order.total, 2247.0);
        assert!(catalog.get_order("ORD-9999").is_none());
    }
}
