//! Shared types for the cafe ordering services
//!
//! Types used by both cafe-server and cafe-client: error codes and the API
//! envelope, domain models, the order state table, request/response DTOs
//! and the distance evaluator.

pub mod client;
pub mod error;
pub mod geo;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use order::{Order, OrderEvent, OrderLine, OrderStatus};
