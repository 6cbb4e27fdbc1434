//! Showtime identity origins
//!
//! Showtime ids cross the wire in two forms: a document-store record id
//! (`showtime:<key>`) or a relational catalog row id with the `sql_`
//! prefix (`sql_42`). Everything downstream works with the parsed tag,
//! never with ad hoc prefix checks.

use crate::utils::AppError;
use std::fmt;
use surrealdb::RecordId;

/// Prefix marking relational-catalog showtime ids on the wire
pub const EXTERNAL_PREFIX: &str = "sql_";

/// Origin-tagged showtime identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowtimeOrigin {
    /// Native document-store showtime
    Native(RecordId),
    /// Row id in the relational catalog
    External(i64),
}

impl ShowtimeOrigin {
    /// Parse a wire-form showtime id
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if let Some(rest) = raw.strip_prefix(EXTERNAL_PREFIX) {
            let id: i64 = rest.parse().map_err(|_| {
                AppError::validation(format!("Invalid catalog showtime ID: {}", raw))
            })?;
            return Ok(Self::External(id));
        }
        let record_id: RecordId = raw
            .parse()
            .map_err(|_| AppError::validation(format!("Invalid showtime ID: {}", raw)))?;
        // 只接受 showtime 表的记录，其他表的 ID 是调用方传错了
        if record_id.table() != "showtime" {
            return Err(AppError::validation(format!(
                "Not a showtime ID: {}",
                raw
            )));
        }
        Ok(Self::Native(record_id))
    }

    /// The logical id clients address this showtime by — the same form
    /// they sent, so fanout events and subscriptions line up.
    pub fn logical_id(&self) -> String {
        match self {
            Self::Native(id) => id.to_string(),
            Self::External(id) => format!("{EXTERNAL_PREFIX}{id}"),
        }
    }

    /// Key for the per-showtime single-writer lock.
    ///
    /// Same string for every request addressing the same logical
    /// showtime, regardless of whether a mirror exists yet.
    pub fn lock_key(&self) -> String {
        self.logical_id()
    }
}

impl fmt::Display for ShowtimeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.logical_id())
    }
}
