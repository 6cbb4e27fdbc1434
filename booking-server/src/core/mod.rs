//! 核心模块 - 配置、全局状态与 HTTP 服务生命周期

pub mod config;
pub mod server;
pub mod state;

pub use config::Config;
pub use server::Server;
pub use state::ServerState;
