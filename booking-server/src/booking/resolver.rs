//! Shadow Showtime Mirror
//!
//! The two stores are genuinely separate systems. This resolver is the
//! single seam that lets the reservation ledger treat every showtime
//! uniformly: native document-store showtimes are used directly,
//! relational-catalog showtimes get a shadow mirror record constructed
//! (or lazily refreshed) on access.
//!
//! Consistency model: mirror facts (price, schedule, capacity) are
//! refreshed on each resolving access; the available-seat counter is
//! copied once at mirror creation and only re-synced by the
//! booking/cancellation paths. Eventual, not strict.

use crate::catalog::{CatalogShowtime, CatalogStore};
use crate::db::models::{Movie, Showtime, Theater};
use crate::db::repository::{MovieRepository, ShowtimeRepository, TheaterRepository};
use crate::utils::{AppError, AppResult};
use surrealdb::RecordId;

use super::origin::ShowtimeOrigin;

/// Showtime facts for availability reads — carries the ledger link only
/// when a document-store record exists to attach reservations to.
#[derive(Debug, Clone)]
pub struct ShowtimeFacts {
    pub logical_id: String,
    pub price: i64,
    pub total_seats: i32,
    pub available_seats: i32,
    pub is_active: bool,
    pub ledger_ref: Option<RecordId>,
}

#[derive(Clone)]
pub struct ShowtimeResolver {
    showtimes: ShowtimeRepository,
    movies: MovieRepository,
    theaters: TheaterRepository,
    catalog: CatalogStore,
}

impl ShowtimeResolver {
    pub fn new(
        showtimes: ShowtimeRepository,
        movies: MovieRepository,
        theaters: TheaterRepository,
        catalog: CatalogStore,
    ) -> Self {
        Self {
            showtimes,
            movies,
            theaters,
            catalog,
        }
    }

    /// Resolve an origin to a document-store showtime the ledger can
    /// attach to, constructing the mirror if needed.
    ///
    /// Write path only — availability reads use [`peek`](Self::peek).
    pub async fn resolve(&self, origin: &ShowtimeOrigin) -> AppResult<Showtime> {
        match origin {
            ShowtimeOrigin::Native(id) => self
                .showtimes
                .find_by_id(id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Showtime {} not found", id))),
            ShowtimeOrigin::External(catalog_id) => {
                let row = self
                    .catalog
                    .fetch_showtime(*catalog_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::not_found(format!("Showtime sql_{} not found", catalog_id))
                    })?;

                match self
                    .showtimes
                    .find_by_catalog_id(&catalog_id.to_string())
                    .await?
                {
                    Some(mirror) => self.refresh_mirror(mirror, &row).await,
                    None => self.construct_mirror(&row).await,
                }
            }
        }
    }

    /// Read-only facts for an origin. Never creates a mirror: an
    /// external showtime nobody booked yet simply has no ledger record
    /// and therefore no taken seats.
    pub async fn peek(&self, origin: &ShowtimeOrigin) -> AppResult<ShowtimeFacts> {
        match origin {
            ShowtimeOrigin::Native(id) => {
                let showtime = self
                    .showtimes
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| AppError::not_found(format!("Showtime {} not found", id)))?;
                Ok(ShowtimeFacts {
                    logical_id: origin.logical_id(),
                    price: showtime.price,
                    total_seats: showtime.total_seats,
                    available_seats: showtime.available_seats,
                    is_active: showtime.is_active,
                    ledger_ref: showtime.id,
                })
            }
            ShowtimeOrigin::External(catalog_id) => {
                let row = self
                    .catalog
                    .fetch_showtime(*catalog_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::not_found(format!("Showtime sql_{} not found", catalog_id))
                    })?;
                let mirror = self
                    .showtimes
                    .find_by_catalog_id(&catalog_id.to_string())
                    .await?;
                Ok(ShowtimeFacts {
                    logical_id: origin.logical_id(),
                    price: row.price,
                    total_seats: row.total_seats as i32,
                    available_seats: row.available_seats as i32,
                    is_active: row.is_active,
                    ledger_ref: mirror.and_then(|m| m.id),
                })
            }
        }
    }

    /// Lazy refresh: pull catalog-sourced facts onto an existing mirror.
    /// The available counter is left alone (see module docs).
    async fn refresh_mirror(
        &self,
        mut mirror: Showtime,
        row: &CatalogShowtime,
    ) -> AppResult<Showtime> {
        let id = mirror
            .id
            .clone()
            .ok_or_else(|| AppError::internal("mirror record without id"))?;
        self.showtimes
            .refresh_catalog_facts(
                &id,
                row.price,
                row.show_date,
                row.show_time.clone(),
                row.total_seats as i32,
                row.is_active,
            )
            .await?;
        mirror.price = row.price;
        mirror.date = row.show_date;
        mirror.time = row.show_time.clone();
        mirror.total_seats = row.total_seats as i32;
        mirror.is_active = row.is_active;
        Ok(mirror)
    }

    /// First booking on a catalog showtime: copy its facts into a new
    /// mirror record, creating placeholder movie/theater shadows when
    /// the document store has never seen them.
    async fn construct_mirror(&self, row: &CatalogShowtime) -> AppResult<Showtime> {
        let movie_id = self.ensure_movie_shadow(row).await?;
        let theater_id = self.ensure_theater_shadow(row).await?;

        let mirror = Showtime {
            id: None,
            movie: movie_id,
            theater: theater_id,
            date: row.show_date,
            time: row.show_time.clone(),
            price: row.price,
            total_seats: row.total_seats as i32,
            available_seats: row.available_seats as i32,
            is_active: true,
            catalog_id: Some(row.id.to_string()),
        };
        let created = self.showtimes.create(mirror).await?;
        tracing::info!(
            catalog_id = row.id,
            mirror = %created.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
            "showtime mirror constructed"
        );
        Ok(created)
    }

    async fn ensure_movie_shadow(&self, row: &CatalogShowtime) -> AppResult<RecordId> {
        if let Some(movie) = self.movies.find_by_title(&row.movie_title).await? {
            return movie
                .id
                .ok_or_else(|| AppError::internal("movie record without id"));
        }

        // Not in the document store — copy from the catalog, or give up
        // if the catalog does not know it either.
        let catalog_movie = self
            .catalog
            .fetch_movie_by_title(&row.movie_title)
            .await?
            .ok_or_else(|| {
                AppError::DependencyMissing(format!(
                    "Movie '{}' not found in either store",
                    row.movie_title
                ))
            })?;

        let created = self
            .movies
            .create(Movie {
                id: None,
                title: catalog_movie.title,
                description: catalog_movie.description.unwrap_or_default(),
                poster: catalog_movie.poster_url.unwrap_or_default(),
                duration: catalog_movie.duration as i32,
                rating: catalog_movie.rating,
                is_showing: catalog_movie.is_showing,
            })
            .await?;
        created
            .id
            .ok_or_else(|| AppError::internal("movie record without id"))
    }

    async fn ensure_theater_shadow(&self, row: &CatalogShowtime) -> AppResult<RecordId> {
        if let Some(theater) = self.theaters.find_by_name(&row.theater_name).await? {
            return theater
                .id
                .ok_or_else(|| AppError::internal("theater record without id"));
        }

        // Theater facts ride along on the showtime row join, so the
        // placeholder can be built without a second catalog read.
        let created = self
            .theaters
            .create(Theater {
                id: None,
                name: row.theater_name.clone(),
                address: row.theater_address.clone().unwrap_or_default(),
                city: row.theater_city.clone().unwrap_or_default(),
            })
            .await?;
        created
            .id
            .ok_or_else(|| AppError::internal("theater record without id"))
    }
}
