//! Member Repository (loyalty point balance)
//!
//! Narrow seam to the Auth/User collaborator: the booking core only
//! ever reads a balance and applies signed deltas. Records are keyed
//! `member:<user_id>` so lookups never need a query.

use super::{BaseRepository, RepoResult};
use crate::db::models::Member;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::RecordId;

const TABLE: &str = "member";

#[derive(Clone)]
pub struct MemberRepository {
    base: BaseRepository,
}

impl MemberRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn record_id(user: &str) -> RecordId {
        RecordId::from_table_key(TABLE, user)
    }

    /// Current point balance; users with no record hold zero points
    pub async fn points(&self, user: &str) -> RepoResult<i64> {
        let member: Option<Member> = self.base.db().select(Self::record_id(user)).await?;
        Ok(member.map(|m| m.points).unwrap_or(0))
    }

    /// Apply a signed point delta, creating the record on first use.
    ///
    /// Balance checks happen in the booking core before calling this;
    /// the floor here only guards against going negative on races.
    pub async fn adjust_points(&self, user: &str, delta: i64) -> RepoResult<i64> {
        // math::max 接收单个数组参数
        let mut result = self
            .base
            .db()
            .query("UPSERT $thing SET points = math::max([(points ?? 0) + $delta, 0]) RETURN AFTER")
            .bind(("thing", Self::record_id(user)))
            .bind(("delta", delta))
            .await?;
        let members: Vec<Member> = result.take(0)?;
        Ok(members.into_iter().next().map(|m| m.points).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DocStore;

    #[tokio::test]
    async fn unknown_users_hold_zero_points() {
        let store = DocStore::memory().await.unwrap();
        let repo = MemberRepository::new(store.db.clone());
        assert_eq!(repo.points("nobody").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn deltas_accumulate_and_floor_at_zero() {
        let store = DocStore::memory().await.unwrap();
        let repo = MemberRepository::new(store.db.clone());

        assert_eq!(repo.adjust_points("u1", 500).await.unwrap(), 500);
        assert_eq!(repo.adjust_points("u1", -200).await.unwrap(), 300);
        // 超额扣减被截断到 0，不允许负余额
        assert_eq!(repo.adjust_points("u1", -1000).await.unwrap(), 0);
        assert_eq!(repo.points("u1").await.unwrap(), 0);
    }
}
