//! Theater Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Theater;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "theater";

#[derive(Clone)]
pub struct TheaterRepository {
    base: BaseRepository,
}

impl TheaterRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find theater by name (cross-store join key, like movie titles)
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Theater>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM theater WHERE name = $name LIMIT 1")
            .bind(("name", name.to_string()))
            .await?;
        let theaters: Vec<Theater> = result.take(0)?;
        Ok(theaters.into_iter().next())
    }

    /// Create a theater record (typically a catalog shadow placeholder)
    pub async fn create(&self, theater: Theater) -> RepoResult<Theater> {
        let created: Option<Theater> = self.base.db().create(TABLE).content(theater).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create theater".to_string()))
    }
}
