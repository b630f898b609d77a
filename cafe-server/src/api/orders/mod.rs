//! Order API Module
//!
//! | 路径 | 方法 | 认证 |
//! |------|------|------|
//! | /api/orders | POST | 无 (顾客下单) |
//! | /api/orders/table/{number}?phone= | GET | 无 (顾客查询) |
//! | /api/orders/{id} | GET | 员工 |
//! | /api/orders/today · /pending · /unpaid · /history | GET | 员工 |
//! | /api/orders/{id}/start-preparing · /complete · /pay · /cancel | POST | 员工 + 角色 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Customer-facing routes
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/orders", post(handler::place_order))
        .route("/api/orders/table/{number}", get(handler::table_orders))
}

/// Staff routes (mounted behind `require_auth`)
pub fn staff_router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Read partitions
        .route("/today", get(handler::today))
        .route("/pending", get(handler::pending))
        .route("/unpaid", get(handler::unpaid))
        .route("/history", get(handler::history))
        .route("/{id}", get(handler::get_by_id))
        // Transitions
        .route("/{id}/start-preparing", post(handler::start_preparing))
        .route("/{id}/complete", post(handler::complete))
        .route("/{id}/pay", post(handler::pay))
        .route("/{id}/cancel", post(handler::cancel))
}
