//! Booking API
//!
//! 预订的完整生命周期：创建、查询、支付确认、取消。
//! 所有接口都要求 `x-user-id` 标识的调用方身份。

mod handler;

use crate::core::ServerState;
use axum::Router;
use axum::routing::{get, post, put};
use std::sync::Arc;

pub fn routes() -> Router<Arc<ServerState>> {
    Router::new()
        .route("/", post(handler::create_booking).get(handler::list_bookings))
        .route(
            "/{id}",
            get(handler::get_booking).delete(handler::cancel_booking),
        )
        .route("/{id}/payment", put(handler::confirm_payment))
}
