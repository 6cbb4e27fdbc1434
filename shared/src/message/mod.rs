//! 座位实时事件类型定义
//!
//! 这些类型在 booking-server 和 clients 之间共享，
//! 通过 WebSocket 以 JSON 文本帧传输。

pub mod payload;
pub use payload::*;

/// 协议版本号
pub const PROTOCOL_VERSION: u16 = 1;
