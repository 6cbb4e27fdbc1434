//! 调用方身份提取
//!
//! 认证由外部的 Auth 服务完成，网关把已验证的用户 ID 放进
//! `x-user-id` 头转发过来。这里只做提取，缺失即 401。

use crate::utils::AppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

const USER_HEADER: &str = "x-user-id";

/// 已验证的调用方身份（不透明用户 ID）
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| CurrentUser(v.to_string()))
            .ok_or(AppError::Unauthorized)
    }
}
