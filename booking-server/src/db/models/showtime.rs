//! Showtime Model
//!
//! A showtime record is either native to the document store or a shadow
//! mirror of a relational catalog row (then `catalog_id` is set). The
//! reservation ledger always attaches to these records, so booking code
//! never cares where a showtime originated.

use super::serde_helpers;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Showtime entity (场次)
///
/// Invariant: `0 <= available_seats <= total_seats`. The available
/// counter is advisory — the authoritative taken-seat state is the
/// ledger scan, not this number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Showtime {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    /// Movie reference
    #[serde(with = "serde_helpers::record_id")]
    pub movie: RecordId,
    /// Theater reference
    #[serde(with = "serde_helpers::record_id")]
    pub theater: RecordId,
    pub date: NaiveDate,
    /// Time of day, "HH:MM"
    pub time: String,
    /// Unit price (VND)
    pub price: i64,
    pub total_seats: i32,
    pub available_seats: i32,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    /// Weak link back to the relational catalog row this record mirrors.
    /// Used only for lookup, never for ownership.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Showtime {
    /// Whether this record mirrors a relational catalog row
    pub fn is_mirror(&self) -> bool {
        self.catalog_id.is_some()
    }
}
