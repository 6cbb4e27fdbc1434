//! Document-store models
//!
//! SurrealDB records for the reservation ledger and the shadow catalog
//! (showtime mirrors plus placeholder movie/theater records).

pub mod serde_helpers;

pub mod booking;
pub mod member;
pub mod movie;
pub mod showtime;
pub mod theater;

pub use booking::Booking;
pub use member::Member;
pub use movie::Movie;
pub use showtime::Showtime;
pub use theater::Theater;
