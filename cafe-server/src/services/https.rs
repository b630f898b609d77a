use crate::auth::require_auth;
use crate::core::ServerState;
use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
///
/// 公共路由 (顾客设备) 与员工路由分开装配；员工路由统一挂认证中间件。
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    let public = Router::<ServerState>::new()
        .merge(crate::api::health::router())
        .merge(crate::api::venue::router())
        .merge(crate::api::tables::router())
        .merge(crate::api::auth::router())
        .merge(crate::api::orders::router());

    let staff = Router::<ServerState>::new()
        .merge(crate::api::auth::staff_router())
        .merge(crate::api::orders::staff_router())
        // 只作用于已匹配的员工路由，未知路径仍返回 404
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(staff)
}

/// Build the complete service: routes, state and Tower HTTP middleware
pub fn build_router(state: ServerState) -> Router {
    build_app(&state)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
}
