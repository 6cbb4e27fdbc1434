//! Booking API Handlers

use crate::api::identity::CurrentUser;
use crate::booking::BookingRequest;
use crate::core::ServerState;
use crate::db::models::Booking;
use crate::utils::{AppError, AppResponse, ok, ok_with_message};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use shared::{BookingStatus, PaymentMethod};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// 逗号分隔的状态过滤，如 `pending,paid`；缺省为仍有效的预订
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub method: PaymentMethod,
}

/// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<ServerState>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<BookingRequest>,
) -> Result<Json<AppResponse<Booking>>, AppError> {
    let booking = state.booking.create_booking(&user, req).await?;
    Ok(ok_with_message(booking, "Booking created"))
}

/// GET /api/bookings?status=pending,paid
pub async fn list_bookings(
    State(state): State<Arc<ServerState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<AppResponse<Vec<Booking>>>, AppError> {
    let statuses = query.status.as_deref().map(parse_statuses).transpose()?;
    let bookings = state.booking.my_bookings(&user, statuses).await?;
    Ok(ok(bookings))
}

/// GET /api/bookings/{id}
pub async fn get_booking(
    State(state): State<Arc<ServerState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<AppResponse<Booking>>, AppError> {
    let booking = state.booking.get_booking(&user, &id).await?;
    Ok(ok(booking))
}

/// PUT /api/bookings/{id}/payment
pub async fn confirm_payment(
    State(state): State<Arc<ServerState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<AppResponse<Booking>>, AppError> {
    let booking = state.booking.confirm_payment(&user, &id, req.method).await?;
    Ok(ok_with_message(booking, "Payment confirmed"))
}

/// DELETE /api/bookings/{id}
pub async fn cancel_booking(
    State(state): State<Arc<ServerState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<AppResponse<Booking>>, AppError> {
    let booking = state.booking.cancel_booking(&user, &id).await?;
    Ok(ok_with_message(booking, "Booking cancelled"))
}

fn parse_statuses(raw: &str) -> Result<Vec<BookingStatus>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s {
            "pending" => Ok(BookingStatus::Pending),
            "paid" => Ok(BookingStatus::Paid),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(AppError::validation(format!(
                "Unknown booking status: {other}"
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_statuses() {
        let parsed = parse_statuses("pending, paid").unwrap();
        assert_eq!(parsed, vec![BookingStatus::Pending, BookingStatus::Paid]);
        assert!(parse_statuses("refunded").is_err());
    }
}
