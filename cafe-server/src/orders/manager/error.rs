use crate::db::StorageError;
use shared::models::StaffRole;
use shared::order::{OrderEvent, OrderStatus};
use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Role {role} may not {event}")]
    Forbidden { role: StaffRole, event: OrderEvent },

    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Cannot {event} an order that is {from}")]
    InvalidTransition { from: OrderStatus, event: OrderEvent },

    #[error("Order changed concurrently: expected {expected}, now {actual}")]
    StaleState {
        expected: OrderStatus,
        actual: OrderStatus,
    },

    #[error("Table not found or inactive: {0}")]
    TableNotFound(u32),

    #[error("Order has no items")]
    EmptyOrder,

    #[error("Too many order lines: {count} (max {max})")]
    TooManyItems { count: usize, max: usize },

    #[error("Invalid quantity {quantity} for menu item {menu_item_id}")]
    InvalidQuantity { menu_item_id: i64, quantity: u32 },

    #[error("Menu item not found: {0}")]
    MenuItemNotFound(i64),

    #[error("Menu item unavailable: {0}")]
    MenuItemUnavailable(i64),

    #[error("{0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ManagerResult<T> = Result<T, ManagerError>;

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        let message = err.to_string();
        match err {
            ManagerError::Storage(e) => {
                tracing::error!(error = %e, "Order storage error");
                e.into()
            }
            ManagerError::Forbidden { role, event } => {
                AppError::with_message(ErrorCode::PermissionDenied, message)
                    .with_detail("role", role.as_str())
                    .with_detail("event", event.as_str())
            }
            ManagerError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, message).with_detail("order_id", id)
            }
            ManagerError::InvalidTransition { from, event } => {
                AppError::with_message(ErrorCode::InvalidTransition, message)
                    .with_detail("status", from.as_str())
                    .with_detail("event", event.as_str())
            }
            ManagerError::StaleState { expected, actual } => {
                AppError::with_message(ErrorCode::StaleState, message)
                    .with_detail("expected", expected.as_str())
                    .with_detail("status", actual.as_str())
            }
            ManagerError::TableNotFound(number) => {
                AppError::with_message(ErrorCode::TableNotFound, message)
                    .with_detail("table_number", number)
            }
            ManagerError::EmptyOrder => AppError::with_message(ErrorCode::EmptyOrder, message),
            ManagerError::TooManyItems { max, .. } => {
                AppError::with_message(ErrorCode::TooManyItems, message).with_detail("max", max)
            }
            ManagerError::InvalidQuantity { menu_item_id, .. } => {
                AppError::with_message(ErrorCode::InvalidQuantity, message)
                    .with_detail("menu_item_id", menu_item_id)
            }
            ManagerError::MenuItemNotFound(id) => {
                AppError::with_message(ErrorCode::MenuItemNotFound, message)
                    .with_detail("menu_item_id", id)
            }
            ManagerError::MenuItemUnavailable(id) => {
                AppError::with_message(ErrorCode::MenuItemUnavailable, message)
                    .with_detail("menu_item_id", id)
            }
            ManagerError::Validation(msg) => AppError::validation(msg),
            ManagerError::Internal(msg) => {
                tracing::error!(error = %msg, "Order manager internal error");
                AppError::internal(msg)
            }
        }
    }
}
