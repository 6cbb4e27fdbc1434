//! Showtime Repository
//!
//! Native showtimes and shadow mirrors of relational catalog rows share
//! the same table; mirrors carry a `catalog_id` back-link.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Showtime;
use chrono::NaiveDate;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "showtime";

#[derive(Clone)]
pub struct ShowtimeRepository {
    base: BaseRepository,
}

impl ShowtimeRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find showtime by record id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Showtime>> {
        let showtime: Option<Showtime> = self.base.db().select(id.clone()).await?;
        Ok(showtime)
    }

    /// Find the mirror tagged with a relational catalog row id
    pub async fn find_by_catalog_id(&self, catalog_id: &str) -> RepoResult<Option<Showtime>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM showtime WHERE catalog_id = $catalog_id LIMIT 1")
            .bind(("catalog_id", catalog_id.to_string()))
            .await?;
        let showtimes: Vec<Showtime> = result.take(0)?;
        Ok(showtimes.into_iter().next())
    }

    /// Create a showtime record (native or mirror)
    pub async fn create(&self, showtime: Showtime) -> RepoResult<Showtime> {
        let created: Option<Showtime> = self.base.db().create(TABLE).content(showtime).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create showtime".to_string()))
    }

    /// Refresh catalog-sourced facts on a mirror record.
    ///
    /// The available counter is deliberately NOT touched here — it is
    /// only re-synced by the booking/cancellation paths.
    pub async fn refresh_catalog_facts(
        &self,
        id: &RecordId,
        price: i64,
        date: NaiveDate,
        time: String,
        total_seats: i32,
        is_active: bool,
    ) -> RepoResult<()> {
        self.base
            .db()
            .query(
                "UPDATE $thing SET price = $price, date = $date, time = $time, \
                 total_seats = $total_seats, is_active = $is_active",
            )
            .bind(("thing", id.clone()))
            .bind(("price", price))
            .bind(("date", date))
            .bind(("time", time))
            .bind(("total_seats", total_seats))
            .bind(("is_active", is_active))
            .await?;
        Ok(())
    }

    /// Adjust the advisory available-seat counter, clamped to
    /// `0..=total_seats`.
    pub async fn adjust_available(&self, id: &RecordId, delta: i32) -> RepoResult<()> {
        // math::min / math::max 接收单个数组参数
        self.base
            .db()
            .query(
                "UPDATE $thing SET available_seats = \
                 math::min([math::max([available_seats + $delta, 0]), total_seats])",
            )
            .bind(("thing", id.clone()))
            .bind(("delta", delta))
            .await?;
        Ok(())
    }
}
