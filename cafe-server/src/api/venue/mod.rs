//! Venue configuration (public)
//!
//! The geofence gate on customer devices reads its admission boundary from
//! here and nowhere else.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/venue", get(handler::get_venue))
}
