//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::client::{HistoryQuery, PlaceOrderRequest, TableOrdersQuery};
use shared::order::{Order, OrderEvent, OrderView};
use shared::util::now_millis;

use crate::api::{ApiResponse, AppResult};
use crate::auth::CurrentStaff;
use crate::core::ServerState;

fn views(orders: Vec<Order>) -> Vec<OrderView> {
    orders.into_iter().map(OrderView::from).collect()
}

// ========== Customer ==========

/// Place an order; the total is always computed server-side
pub async fn place_order(
    State(state): State<ServerState>,
    Json(req): Json<PlaceOrderRequest>,
) -> AppResult<ApiResponse<OrderView>> {
    let order = state.orders.place_order(&req)?;
    Ok(ApiResponse::success(order.into()))
}

/// The customer's recent orders at a table, matched by phone
pub async fn table_orders(
    State(state): State<ServerState>,
    Path(number): Path<u32>,
    Query(query): Query<TableOrdersQuery>,
) -> AppResult<ApiResponse<Vec<OrderView>>> {
    let orders = state
        .orders
        .table_orders(number, &query.phone, now_millis())?;
    Ok(ApiResponse::success(views(orders)))
}

// ========== Staff reads ==========

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<OrderView>> {
    let order = state.orders.get_order(id)?;
    Ok(ApiResponse::success(order.into()))
}

pub async fn today(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<OrderView>>> {
    let orders = state.orders.todays_orders(now_millis())?;
    Ok(ApiResponse::success(views(orders)))
}

pub async fn pending(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<OrderView>>> {
    Ok(ApiResponse::success(views(state.orders.pending_queue()?)))
}

pub async fn unpaid(State(state): State<ServerState>) -> AppResult<ApiResponse<Vec<OrderView>>> {
    Ok(ApiResponse::success(views(state.orders.unpaid()?)))
}

pub async fn history(
    State(state): State<ServerState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<ApiResponse<Vec<OrderView>>> {
    let orders = state.orders.history(query.from, query.to)?;
    Ok(ApiResponse::success(views(orders)))
}

// ========== Transitions ==========

async fn apply(
    state: &ServerState,
    id: i64,
    event: OrderEvent,
    staff: &CurrentStaff,
) -> AppResult<ApiResponse<OrderView>> {
    let order = state.orders.transition(id, event, staff)?;
    Ok(ApiResponse::success(order.into()))
}

pub async fn start_preparing(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    staff: CurrentStaff,
) -> AppResult<ApiResponse<OrderView>> {
    apply(&state, id, OrderEvent::StartPreparing, &staff).await
}

pub async fn complete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    staff: CurrentStaff,
) -> AppResult<ApiResponse<OrderView>> {
    apply(&state, id, OrderEvent::MarkComplete, &staff).await
}

pub async fn pay(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    staff: CurrentStaff,
) -> AppResult<ApiResponse<OrderView>> {
    apply(&state, id, OrderEvent::MarkPaid, &staff).await
}

pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    staff: CurrentStaff,
) -> AppResult<ApiResponse<OrderView>> {
    let order = state.orders.cancel_order(id, &staff)?;
    Ok(ApiResponse::success(order.into()))
}
