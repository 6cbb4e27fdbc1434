//! Showtime availability endpoint
//!
//! 只读接口，不需要调用方身份，也绝不创建镜像记录。

use crate::booking::AvailabilityView;
use crate::core::ServerState;
use crate::utils::{AppError, AppResponse, ok};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<ServerState>> {
    Router::new().route("/{id}/availability", get(get_availability))
}

/// GET /api/showtimes/{id}/availability
///
/// `id` 接受两种形式：`showtime:<key>`（文档库原生）或 `sql_<n>`
/// （关系目录行）。
async fn get_availability(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Result<Json<AppResponse<AvailabilityView>>, AppError> {
    let view = state.booking.get_availability(&id).await?;
    Ok(ok(view))
}
