//! Order lifecycle state table
//!
//! ```text
//! pending ──start_preparing──▶ preparing ──mark_complete──▶ completed ──mark_paid──▶ paid
//!    │                            │
//!    └──────────cancel────────────┴──────▶ cancelled
//! ```
//!
//! `paid` and `cancelled` are terminal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 订单状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Completed,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Completed,
        OrderStatus::Paid,
        OrderStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Completed => "completed",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// No transition leaves a terminal status
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }

    /// Events legal from this status, in table order
    pub fn allowed_events(&self) -> Vec<OrderEvent> {
        OrderEvent::ALL
            .into_iter()
            .filter(|event| event.target(*self).is_some())
            .collect()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Staff-driven lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderEvent {
    StartPreparing,
    MarkComplete,
    MarkPaid,
    Cancel,
}

impl OrderEvent {
    pub const ALL: [OrderEvent; 4] = [
        OrderEvent::StartPreparing,
        OrderEvent::MarkComplete,
        OrderEvent::MarkPaid,
        OrderEvent::Cancel,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderEvent::StartPreparing => "start_preparing",
            OrderEvent::MarkComplete => "mark_complete",
            OrderEvent::MarkPaid => "mark_paid",
            OrderEvent::Cancel => "cancel",
        }
    }

    /// Target status when applied from `from`, or `None` if the event is illegal there
    pub const fn target(&self, from: OrderStatus) -> Option<OrderStatus> {
        use OrderEvent::*;
        use OrderStatus::*;
        match (self, from) {
            (StartPreparing, Pending) => Some(Preparing),
            (MarkComplete, Preparing) => Some(Completed),
            (MarkPaid, Completed) => Some(Paid),
            (Cancel, Pending | Preparing) => Some(Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
