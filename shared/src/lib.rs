//! Shared types for the seat reservation platform
//!
//! Common vocabulary used by both the booking server and its clients:
//! ticket classes, booking lifecycle status, add-on selections, and the
//! realtime seat-event payloads pushed over the fanout channel.

pub mod message;
pub mod types;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Seat event re-exports (for convenient access)
pub use message::{SeatEvent, SubscribeRequest};
pub use types::{AddonSelection, BookingStatus, PaymentMethod, TicketClass};
