use axum::extract::{Path, State};
use shared::models::TableVerification;
use shared::{AppError, ErrorCode};

use crate::api::{ApiResponse, AppResult};
use crate::core::ServerState;

/// 验证桌号存在且启用
pub async fn verify(
    State(state): State<ServerState>,
    Path(number): Path<u32>,
) -> AppResult<ApiResponse<TableVerification>> {
    match state.storage.get_dining_table(number)? {
        Some(table) if table.is_active => Ok(ApiResponse::success(TableVerification::from(&table))),
        _ => Err(AppError::new(ErrorCode::TableNotFound).with_detail("table_number", number)),
    }
}
