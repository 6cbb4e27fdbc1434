//! SQLite-backed catalog store

use super::Advisory;
use crate::utils::AppError;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;

/// Showtime row joined with its movie and theater facts
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogShowtime {
    pub id: i64,
    pub movie_id: i64,
    pub theater_id: i64,
    pub show_date: NaiveDate,
    pub show_time: String,
    pub price: i64,
    pub total_seats: i64,
    pub available_seats: i64,
    pub is_active: bool,
    pub movie_title: String,
    pub movie_duration: i64,
    pub theater_name: String,
    pub theater_address: Option<String>,
    pub theater_city: Option<String>,
}

/// Movie row, used when constructing shadow placeholder records
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogMovie {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub duration: i64,
    pub rating: f64,
    pub poster_url: Option<String>,
    pub is_showing: bool,
}

/// Catalog store — owns the SQLite connection pool
#[derive(Clone)]
pub struct CatalogStore {
    pub pool: SqlitePool,
}

impl CatalogStore {
    /// Open the on-disk catalog with WAL mode and run migrations
    pub async fn open(db_path: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| AppError::database(format!("Invalid catalog path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open catalog: {e}")))?;

        // busy_timeout: 写冲突时等待 5s 而非立即失败
        sqlx::query("PRAGMA busy_timeout = 5000;")
            .execute(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to set busy_timeout: {e}")))?;

        Self::migrate(&pool).await?;
        tracing::info!("Catalog store opened (SQLite WAL, busy_timeout=5000ms)");
        Ok(Self { pool })
    }

    /// Open an in-memory catalog (tests)
    pub async fn memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::database(format!("Invalid catalog path: {e}")))?;
        // Single connection so the in-memory database survives between calls
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open catalog: {e}")))?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply catalog migrations: {e}")))?;
        Ok(())
    }

    /// Fetch an active showtime row with its movie/theater facts.
    ///
    /// Inactive rows resolve to `None` — the caller cannot distinguish
    /// deactivated from absent, matching the read contract.
    pub async fn fetch_showtime(&self, id: i64) -> Result<Option<CatalogShowtime>, AppError> {
        let row = sqlx::query_as::<_, CatalogShowtime>(
            r#"
            SELECT s.id, s.movie_id, s.theater_id, s.show_date, s.show_time,
                   s.price, s.total_seats, s.available_seats, s.is_active,
                   m.title AS movie_title, m.duration AS movie_duration,
                   t.name AS theater_name, t.address AS theater_address, t.city AS theater_city
            FROM showtimes s
            JOIN movies m ON s.movie_id = m.id
            JOIN theaters t ON s.theater_id = t.id
            WHERE s.id = ? AND s.is_active = 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Fetch a movie row by title (shadow placeholder construction)
    pub async fn fetch_movie_by_title(&self, title: &str) -> Result<Option<CatalogMovie>, AppError> {
        let row = sqlx::query_as::<_, CatalogMovie>(
            "SELECT id, title, description, duration, rating, poster_url, is_showing \
             FROM movies WHERE title = ?",
        )
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Advisory: decrement the available-seat counter.
    ///
    /// The guarded WHERE keeps the counter non-negative; an update that
    /// matches no row (missing or floored) is reported as skipped.
    pub async fn decrement_available(&self, id: i64, count: i64) -> Advisory {
        let result = sqlx::query(
            "UPDATE showtimes SET available_seats = available_seats - ? \
             WHERE id = ? AND available_seats >= ?",
        )
        .bind(count)
        .bind(id)
        .bind(count)
        .execute(&self.pool)
        .await;

        match result {
            Ok(r) if r.rows_affected() > 0 => Advisory::Applied,
            Ok(_) => Advisory::Skipped(format!(
                "showtime {id} missing or fewer than {count} seats left"
            )),
            Err(e) => Advisory::Skipped(e.to_string()),
        }
    }

    /// Advisory: give seats back after a cancellation, capped at capacity
    pub async fn increment_available(&self, id: i64, count: i64) -> Advisory {
        let result = sqlx::query(
            "UPDATE showtimes SET available_seats = MIN(available_seats + ?, total_seats) \
             WHERE id = ?",
        )
        .bind(count)
        .bind(id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(r) if r.rows_affected() > 0 => Advisory::Applied,
            Ok(_) => Advisory::Skipped(format!("showtime {id} missing")),
            Err(e) => Advisory::Skipped(e.to_string()),
        }
    }
}
