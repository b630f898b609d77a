use axum::extract::State;
use shared::models::VenueInfo;

use crate::api::{ApiResponse, AppResult};
use crate::core::ServerState;

/// GET /api/venue
pub async fn get_venue(State(state): State<ServerState>) -> AppResult<ApiResponse<VenueInfo>> {
    Ok(ApiResponse::success(state.venue_info().clone()))
}
