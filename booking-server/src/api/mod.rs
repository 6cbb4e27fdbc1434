//! HTTP API
//!
//! # 路由
//!
//! | 方法 | 路径 | 说明 |
//! |------|------|------|
//! | GET | /api/health | 健康检查 |
//! | GET | /api/showtimes/{id}/availability | 座位可用性快照 |
//! | POST | /api/bookings | 创建预订 |
//! | GET | /api/bookings | 我的预订历史 |
//! | GET | /api/bookings/{id} | 预订详情 |
//! | PUT | /api/bookings/{id}/payment | 确认支付 |
//! | DELETE | /api/bookings/{id} | 取消预订 |
//! | GET | /api/ws/seats | WebSocket 座位事件 |

pub mod bookings;
pub mod health;
pub mod identity;
pub mod showtimes;

use crate::core::ServerState;
use crate::realtime::socket::seat_socket_handler;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Assemble the API router (state not yet attached)
pub fn build_router() -> Router<Arc<ServerState>> {
    Router::new()
        .nest("/api/health", health::routes())
        .nest("/api/showtimes", showtimes::routes())
        .nest("/api/bookings", bookings::routes())
        .route("/api/ws/seats", get(seat_socket_handler))
}

/// Attach state and the middleware stack
pub fn build_app(state: Arc<ServerState>) -> Router {
    build_router()
        .layer(
            tower::ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
