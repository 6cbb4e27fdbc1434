//! Member Model (loyalty point balance)

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Loyalty point balance for one user.
///
/// User identity itself belongs to the auth collaborator; this record
/// only carries the point balance the payment flow reads and adjusts.
/// Keyed as `member:<user_id>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub points: i64,
}
