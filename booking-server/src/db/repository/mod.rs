//! Repository Module
//!
//! Provides access to the SurrealDB tables backing the reservation
//! ledger and the shadow catalog.

// Shadow catalog
pub mod movie;
pub mod showtime;
pub mod theater;

// Reservation ledger
pub mod booking;

// Loyalty
pub mod member;

// Re-exports
pub use booking::BookingRepository;
pub use member::MemberRepository;
pub use movie::MovieRepository;
pub use showtime::ShowtimeRepository;
pub use theater::TheaterRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: let id: RecordId = "showtime:abc".parse()?;
//   - 创建: let id = RecordId::from_table_key("member", "u1");
//   - CRUD: db.select(id) / db.delete(id) 直接使用 RecordId

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
