//! Persisted order records

use super::state::{OrderEvent, OrderStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order line with name/price snapshot taken at order time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub menu_item_id: i64,
    /// Menu item name snapshot
    pub name: String,
    /// Unit price snapshot
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl OrderLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// 订单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub table_number: u32,
    pub customer_name: String,
    pub customer_phone: String,
    pub items: Vec<OrderLine>,
    /// Σ unit_price × quantity, computed server-side
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis of the last status change (== created_at until first transition)
    pub status_changed_at: i64,
    /// Staff who performed the last transition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_changed_by: Option<i64>,
}

impl Order {
    /// Sum of snapshot price × quantity over `items`
    pub fn compute_total(items: &[OrderLine]) -> Decimal {
        items.iter().map(OrderLine::line_total).sum()
    }

    pub fn allowed_events(&self) -> Vec<OrderEvent> {
        self.status.allowed_events()
    }
}

/// Order as returned by the API, with the events currently legal on it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub allowed_events: Vec<OrderEvent>,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        let allowed_events = order.allowed_events();
        Self {
            order,
            allowed_events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: Decimal, quantity: u32) -> OrderLine {
        OrderLine {
            menu_item_id: 1,
            name: "Flat white".to_string(),
            unit_price: price,
            quantity,
            instructions: None,
        }
    }

    #[test]
    fn total_sums_price_times_quantity() {
        let items = vec![
            line(Decimal::new(450, 2), 2),
            line(Decimal::new(330, 2), 3),
        ];
        assert_eq!(Order::compute_total(&items), Decimal::new(1890, 2));
    }

    #[test]
    fn view_carries_allowed_events() {
        let order = Order {
            id: 7,
            table_number: 3,
            customer_name: "Ana".to_string(),
            customer_phone: "600111222".to_string(),
            items: vec![line(Decimal::new(250, 2), 1)],
            total: Decimal::new(250, 2),
            status: OrderStatus::Completed,
            notes: None,
            created_at: 1,
            status_changed_at: 1,
            status_changed_by: None,
        };
        let view = OrderView::from(order);
        assert_eq!(view.allowed_events, vec![OrderEvent::MarkPaid]);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["allowed_events"][0], "mark_paid");
        assert_eq!(json["total"], 2.5);
    }
}
