//! Movie Model (shadow record)

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Movie entity in the document store.
///
/// Movies booked through the relational catalog get a placeholder copy
/// here so showtime mirrors always have something to reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub poster: String,
    pub duration: i32,
    #[serde(default)]
    pub rating: f64,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_showing: bool,
}

fn default_true() -> bool {
    true
}
