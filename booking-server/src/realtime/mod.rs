//! 实时座位推送
//!
//! - [`fanout`] - 按场次分发座位事件的注入式广播中心
//! - [`socket`] - WebSocket 桥：客户端订阅场次频道，接收 JSON 事件

pub mod fanout;
pub mod socket;

pub use fanout::SeatFanout;
