//! 统一错误处理
//!
//! 提供应用级错误类型和响应结构：
//! - [`AppError`] - 应用错误枚举
//! - [`AppResponse`] - API 响应结构
//!
//! # 错误码规范
//!
//! | 前缀 | 分类 | 示例 |
//! |------|------|------|
//! | E00xx | 通用错误 | E0003 资源不存在 |
//! | E01xx | 订座业务错误 | E0103 座位冲突 |
//! | E3xxx | 认证错误 | E3001 未登录 |
//! | E9xxx | 系统错误 | E9002 数据库错误 |
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::not_found("Showtime not found"))
//!
//! // 返回成功响应
//! Ok(ok(data))
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::db::repository::RepoError;

/// API 统一响应结构
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// 错误码 (E0000 表示成功)
    pub code: String,
    /// 消息
    pub message: String,
    /// 响应数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 应用错误枚举
///
/// # 错误分类
///
/// | 分类 | 说明 |
/// |------|------|
/// | 认证错误 | 缺少调用方身份、预订不属于调用方 |
/// | 订座业务错误 | 场次下架、座位冲突、容量/积分不足、状态机违规 |
/// | 系统错误 | 数据库错误、内部错误、验证失败 |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 认证错误 (4xx) ==========
    #[error("Authentication required")]
    /// 缺少调用方身份，或预订不属于调用方 (401)
    Unauthorized,

    // ========== 订座业务错误 (4xx) ==========
    #[error("Resource not found: {0}")]
    /// 场次/预订/电影/影院不存在 (404)
    NotFound(String),

    #[error("Showtime inactive: {0}")]
    /// 场次已下架 (400)
    Inactive(String),

    #[error("Insufficient capacity: {0}")]
    /// 剩余座位数不足 (400)
    InsufficientCapacity(String),

    #[error("Seats already taken: {0:?}")]
    /// 座位冲突 - 携带冲突座位列表 (409)
    SeatConflict(Vec<String>),

    #[error("Insufficient points: {0}")]
    /// 积分余额不足 (400)
    InsufficientPoints(String),

    #[error("Already processed: {0}")]
    /// 预订已处理，不能重复支付 (400)
    AlreadyProcessed(String),

    #[error("Not cancellable: {0}")]
    /// 预订不可取消（已支付或已取消）(400)
    NotCancellable(String),

    #[error("Dependency missing: {0}")]
    /// 跨库同步缺口 - 两个存储中都找不到依赖记录 (404)
    DependencyMissing(String),

    #[error("Validation failed: {0}")]
    /// 验证失败 (400)
    Validation(String),

    // ========== 系统错误 (5xx) ==========
    #[error("Database error: {0}")]
    /// 数据库错误 (500)
    Database(String),

    #[error("Internal server error: {0}")]
    /// 内部错误 (500)
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // SeatConflict carries structured data so the client can re-render
        // the seat map without a full refetch.
        if let AppError::SeatConflict(seats) = &self {
            let body = Json(AppResponse {
                code: "E0103".to_string(),
                message: format!("Seats already taken: {}", seats.join(", ")),
                data: Some(serde_json::json!({ "conflictSeats": seats })),
            });
            return (StatusCode::CONFLICT, body).into_response();
        }

        let (status, code, message) = match &self {
            // Authentication errors (401)
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "E3001", self.to_string()),

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),
            AppError::DependencyMissing(msg) => (StatusCode::NOT_FOUND, "E0107", msg.clone()),

            // Booking business errors (400)
            AppError::Inactive(msg) => (StatusCode::BAD_REQUEST, "E0101", msg.clone()),
            AppError::InsufficientCapacity(msg) => (StatusCode::BAD_REQUEST, "E0102", msg.clone()),
            AppError::InsufficientPoints(msg) => (StatusCode::BAD_REQUEST, "E0104", msg.clone()),
            AppError::AlreadyProcessed(msg) => (StatusCode::BAD_REQUEST, "E0105", msg.clone()),
            AppError::NotCancellable(msg) => (StatusCode::BAD_REQUEST, "E0106", msg.clone()),

            // Validation (400)
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),

            // Handled above
            AppError::SeatConflict(_) => unreachable!(),

            // Database errors (500)
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Database error".to_string(),
                )
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

// ========== Conversions ==========

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Validation(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

impl From<surrealdb::Error> for AppError {
    fn from(e: surrealdb::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "Success".to_string(),
        data: Some(data),
    })
}

/// Create a successful response with custom message
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: message.into(),
        data: Some(data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_conflict_lists_offending_seats() {
        let err = AppError::SeatConflict(vec!["A3".to_string()]);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn repo_not_found_maps_to_not_found() {
        let err: AppError = RepoError::NotFound("booking x".to_string()).into();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
