//! Booking Model (reservation ledger record)

use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{AddonSelection, BookingStatus, PaymentMethod, TicketClass};
use surrealdb::RecordId;

/// One user's claim on a set of seats for one showtime.
///
/// A seat is "taken" for a showtime when any booking with status
/// pending or paid references it — this is the concurrency-critical
/// invariant the availability scan enforces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// Owning user id (opaque identity issued by the auth collaborator)
    pub user: String,
    /// Showtime reference (document-store record, mirror or native)
    #[serde(with = "serde_helpers::record_id")]
    pub showtime: RecordId,
    /// Seat labels, e.g. ["A1", "A2"]. Unique within one booking.
    pub seats: Vec<String>,
    #[serde(default)]
    pub ticket_class: TicketClass,
    #[serde(default)]
    pub addons: AddonSelection,
    /// Computed total price (VND)
    pub total_price: i64,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    /// Unique human-readable code, e.g. "BKMF3K2A1B2C3D"
    pub booking_code: String,
    #[serde(default)]
    pub points_earned: i64,
    #[serde(default)]
    pub points_used: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
}
