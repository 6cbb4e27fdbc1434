//! Database Module
//!
//! Embedded SurrealDB document store: reservation ledger, shadow
//! catalog records, and loyalty balances.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "cinema";
const DATABASE: &str = "booking";

/// Document-store service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DocStore {
    pub db: Surreal<Db>,
}

impl DocStore {
    /// Open the on-disk store (RocksDB engine)
    pub async fn open(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open document store: {e}")))?;
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;
        tracing::info!(path = %db_path, "Document store opened (SurrealDB/RocksDB)");
        Ok(Self { db })
    }

    /// Open an in-memory store (tests and ephemeral runs)
    pub async fn memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory store: {e}")))?;
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;
        Ok(Self { db })
    }
}
