//! Booking Repository (Reservation Ledger)
//!
//! Authoritative store for which seats are taken. A seat is taken for a
//! showtime when any booking here with status pending or paid lists it.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Booking;
use chrono::{DateTime, Utc};
use shared::{BookingStatus, PaymentMethod};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "booking";

/// Statuses that hold seats
const ACTIVE_STATUSES: [&str; 2] = ["pending", "paid"];

#[derive(Clone)]
pub struct BookingRepository {
    base: BaseRepository,
}

impl BookingRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find booking by record id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Booking>> {
        let thing: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid booking ID: {}", id)))?;
        let booking: Option<Booking> = self.base.db().select(thing).await?;
        Ok(booking)
    }

    /// All seat-holding (pending | paid) bookings for a showtime.
    ///
    /// This is the read the availability resolver is built on; it runs
    /// fresh on every call, there is no denormalized taken-seats field.
    pub async fn find_active_by_showtime(
        &self,
        showtime: &RecordId,
    ) -> RepoResult<Vec<Booking>> {
        // showtime 字段以 "table:id" 字符串入库（见 serde_helpers），比较时同样用字符串
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM booking WHERE showtime = $showtime AND status IN $statuses")
            .bind(("showtime", showtime.to_string()))
            .bind(("statuses", ACTIVE_STATUSES.to_vec()))
            .await?;
        let bookings: Vec<Booking> = result.take(0)?;
        Ok(bookings)
    }

    /// Find booking by its human-readable code (collision check)
    pub async fn find_by_code(&self, code: &str) -> RepoResult<Option<Booking>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM booking WHERE booking_code = $code LIMIT 1")
            .bind(("code", code.to_string()))
            .await?;
        let bookings: Vec<Booking> = result.take(0)?;
        Ok(bookings.into_iter().next())
    }

    /// A user's booking history, newest first
    pub async fn find_by_user(
        &self,
        user: &str,
        statuses: &[BookingStatus],
    ) -> RepoResult<Vec<Booking>> {
        let status_strings: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM booking WHERE user = $user AND status IN $statuses \
                 ORDER BY created_at DESC",
            )
            .bind(("user", user.to_string()))
            .bind(("statuses", status_strings))
            .await?;
        let bookings: Vec<Booking> = result.take(0)?;
        Ok(bookings)
    }

    /// Persist a new reservation
    pub async fn create(&self, booking: Booking) -> RepoResult<Booking> {
        let created: Option<Booking> = self.base.db().create(TABLE).content(booking).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create booking".to_string()))
    }

    /// Transition pending → paid, recording payment facts and earned points
    pub async fn mark_paid(
        &self,
        id: &RecordId,
        method: PaymentMethod,
        points_earned: i64,
        paid_at: DateTime<Utc>,
    ) -> RepoResult<Booking> {
        self.base
            .db()
            .query(
                "UPDATE $thing SET status = 'paid', payment_method = $method, \
                 points_earned = $points_earned, paid_at = $paid_at",
            )
            .bind(("thing", id.clone()))
            .bind(("method", method))
            .bind(("points_earned", points_earned))
            .bind(("paid_at", paid_at))
            .await?;
        let updated: Option<Booking> = self.base.db().select(id.clone()).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Booking {} not found", id)))
    }

    /// Transition pending → cancelled
    pub async fn mark_cancelled(&self, id: &RecordId) -> RepoResult<Booking> {
        self.base
            .db()
            .query("UPDATE $thing SET status = 'cancelled'")
            .bind(("thing", id.clone()))
            .await?;
        let updated: Option<Booking> = self.base.db().select(id.clone()).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Booking {} not found", id)))
    }
}
