//! Booking Server - 电影订座服务
//!
//! # 架构概述
//!
//! 订座核心围绕两个事实来源工作：
//!
//! - **预订台账** (`db`): 嵌入式 SurrealDB 文档库，座位占用的权威记录
//! - **关系目录** (`catalog`): SQLite 目录库，电影/影院/场次的价格与容量事实
//! - **订座核心** (`booking`): 镜像解析、可用性扫描、预订事务
//! - **实时推送** (`realtime`): 按场次分发座位事件的 WebSocket 通道
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! booking-server/src/
//! ├── core/          # 配置、状态、服务器生命周期
//! ├── api/           # HTTP 路由和处理器
//! ├── booking/       # 订座核心（解析、锁、事务）
//! ├── catalog/       # 关系目录适配层
//! ├── realtime/      # 座位事件分发与 WebSocket 桥
//! ├── db/            # 文档库（台账、镜像、积分）
//! └── utils/         # 错误、日志等工具
//! ```

pub mod api;
pub mod booking;
pub mod catalog;
pub mod core;
pub mod db;
pub mod realtime;
pub mod utils;

// Re-export 公共类型
pub use api::identity::CurrentUser;
pub use booking::{BookingRequest, BookingService, ShowtimeOrigin};
pub use core::{Config, Server, ServerState};
pub use realtime::SeatFanout;
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv, 工作目录, 日志)
pub fn setup_environment() -> Result<Config, Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_dir = config.log_dir();
    if config.is_production() {
        init_logger_with_file(None, log_dir.to_str());
    } else {
        init_logger();
    }
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    ____              __   _
   / __ )____  ____  / /__(_)___  ____ _
  / __  / __ \/ __ \/ //_/ / __ \/ __ `/
 / /_/ / /_/ / /_/ / ,< / / / / / /_/ /
/_____/\____/\____/_/|_/_/_/ /_/\__, /
                               /____/
    "#
    );
}
