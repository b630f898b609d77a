use axum::extract::State;
use shared::client::HealthResponse;

use crate::api::{ApiResponse, AppResult};
use crate::core::ServerState;

/// 基础健康检查
pub async fn health(State(state): State<ServerState>) -> AppResult<ApiResponse<HealthResponse>> {
    Ok(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    }))
}
