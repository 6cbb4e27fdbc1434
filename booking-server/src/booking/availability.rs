//! Availability Resolver
//!
//! Computes the authoritative taken-seat set for a showtime by scanning
//! active reservations. Recomputed on every read — there is no cached
//! "taken seats" field, trading a small read cost for correctness
//! against concurrent writers.

use crate::db::repository::BookingRepository;
use crate::utils::AppResult;
use std::collections::BTreeSet;
use surrealdb::RecordId;

#[derive(Clone)]
pub struct AvailabilityResolver {
    bookings: BookingRepository,
}

impl AvailabilityResolver {
    pub fn new(bookings: BookingRepository) -> Self {
        Self { bookings }
    }

    /// Seat labels currently taken on a showtime, deduplicated and
    /// sorted. A showtime with no reservations yields an empty set.
    pub async fn taken_seats(&self, showtime: &RecordId) -> AppResult<Vec<String>> {
        let active = self.bookings.find_active_by_showtime(showtime).await?;
        let seats: BTreeSet<String> = active.into_iter().flat_map(|b| b.seats).collect();
        Ok(seats.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DocStore;
    use crate::db::models::Booking;
    use chrono::Utc;
    use shared::{AddonSelection, BookingStatus, TicketClass};

    fn booking(showtime: &RecordId, seats: &[&str], status: BookingStatus) -> Booking {
        Booking {
            id: None,
            user: "u1".to_string(),
            showtime: showtime.clone(),
            seats: seats.iter().map(|s| s.to_string()).collect(),
            ticket_class: TicketClass::Standard,
            addons: AddonSelection::default(),
            total_price: 100000,
            status,
            payment_method: None,
            booking_code: format!("BK{}", seats.join("")),
            points_earned: 0,
            points_used: 0,
            created_at: Utc::now(),
            paid_at: None,
        }
    }

    #[tokio::test]
    async fn empty_showtime_has_no_taken_seats() {
        let store = DocStore::memory().await.unwrap();
        let resolver = AvailabilityResolver::new(BookingRepository::new(store.db.clone()));
        let showtime = RecordId::from_table_key("showtime", "empty");
        assert!(resolver.taken_seats(&showtime).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn flattens_and_dedupes_active_reservations() {
        let store = DocStore::memory().await.unwrap();
        let repo = BookingRepository::new(store.db.clone());
        let resolver = AvailabilityResolver::new(repo.clone());
        let showtime = RecordId::from_table_key("showtime", "s1");

        repo.create(booking(&showtime, &["A1", "A2"], BookingStatus::Pending))
            .await
            .unwrap();
        repo.create(booking(&showtime, &["B1"], BookingStatus::Paid))
            .await
            .unwrap();
        // cancelled reservations do not hold seats
        repo.create(booking(&showtime, &["C1"], BookingStatus::Cancelled))
            .await
            .unwrap();

        let taken = resolver.taken_seats(&showtime).await.unwrap();
        assert_eq!(taken, vec!["A1", "A2", "B1"]);
    }

    #[tokio::test]
    async fn other_showtimes_do_not_leak() {
        let store = DocStore::memory().await.unwrap();
        let repo = BookingRepository::new(store.db.clone());
        let resolver = AvailabilityResolver::new(repo.clone());
        let s1 = RecordId::from_table_key("showtime", "s1");
        let s2 = RecordId::from_table_key("showtime", "s2");

        repo.create(booking(&s1, &["A1"], BookingStatus::Pending))
            .await
            .unwrap();

        assert!(resolver.taken_seats(&s2).await.unwrap().is_empty());
    }
}
