//! Relational catalog adapter
//!
//! Read side of the SQLite catalog (movies, theaters, showtimes):
//! canonical price, capacity, and identity facts. The only writes this
//! module performs are the advisory available-seat counter adjustments,
//! which go through [`Advisory`] and can never fail the caller.

mod store;

pub use store::{CatalogMovie, CatalogShowtime, CatalogStore};

/// Outcome of an advisory (best-effort) write.
///
/// Distinct from `Result` on purpose: the ledger is authoritative for
/// seat state, the relational counter is a display/capacity hint, so a
/// failed counter update must be logged and swallowed — never bubbled
/// up to fail the booking that already committed.
#[must_use = "advisory outcomes should be logged via .log()"]
#[derive(Debug)]
pub enum Advisory {
    /// The counter update was applied
    Applied,
    /// The update did not happen; carries the reason for the log line
    Skipped(String),
}

impl Advisory {
    /// Log a skipped advisory write, then drop the outcome
    pub fn log(self, context: &str) {
        if let Advisory::Skipped(reason) = self {
            tracing::warn!(target: "catalog", context, reason = %reason, "advisory counter update skipped");
        }
    }

    #[cfg(test)]
    pub fn applied(&self) -> bool {
        matches!(self, Advisory::Applied)
    }
}
