//! Movie Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Movie;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "movie";

#[derive(Clone)]
pub struct MovieRepository {
    base: BaseRepository,
}

impl MovieRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find movie by title.
    ///
    /// Titles are the join key between the two stores — the relational
    /// catalog has no document-store ids, so mirrors match on title.
    pub async fn find_by_title(&self, title: &str) -> RepoResult<Option<Movie>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM movie WHERE title = $title LIMIT 1")
            .bind(("title", title.to_string()))
            .await?;
        let movies: Vec<Movie> = result.take(0)?;
        Ok(movies.into_iter().next())
    }

    /// Create a movie record (typically a catalog shadow placeholder)
    pub async fn create(&self, movie: Movie) -> RepoResult<Movie> {
        let created: Option<Movie> = self.base.db().create(TABLE).content(movie).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create movie".to_string()))
    }
}
