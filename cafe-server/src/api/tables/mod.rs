//! Dining Table API Module
//!
//! Tables are managed externally; customers only verify the number printed
//! on their QR code.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/tables/{number}/verify", get(handler::verify))
}
