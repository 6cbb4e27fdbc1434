//! 订座核心
//!
//! # 模块结构
//!
//! - [`origin`] - 场次标识的来源标签（文档库原生 / 关系目录镜像）
//! - [`resolver`] - 影子场次镜像：把任一来源解析成可挂账的文档记录
//! - [`availability`] - 可用性解析：扫描台账计算已占座位
//! - [`locks`] - 每场次单写者锁，封闭 check-then-insert 竞态
//! - [`code`] - 预订码生成
//! - [`service`] - 预订事务与边界操作（支付确认、取消、历史查询）

pub mod availability;
pub mod code;
pub mod locks;
pub mod origin;
pub mod resolver;
pub mod service;

pub use availability::AvailabilityResolver;
pub use locks::ShowtimeLocks;
pub use origin::ShowtimeOrigin;
pub use resolver::ShowtimeResolver;
pub use service::{AvailabilityView, BookingRequest, BookingService};
