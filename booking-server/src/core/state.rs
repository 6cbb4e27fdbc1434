//! 服务全局状态
//!
//! 所有共享资源在启动时构建一次，通过 axum state 注入到 handler。
//! 广播中心也是注入进来的普通状态，不存在全局单例，处理请求的
//! 代码拿不到状态就发不了事件。

use crate::booking::BookingService;
use crate::catalog::CatalogStore;
use crate::core::Config;
use crate::db::DocStore;
use crate::realtime::SeatFanout;
use crate::utils::{AppError, AppResult};
use std::sync::Arc;

pub struct ServerState {
    pub config: Arc<Config>,
    pub doc: DocStore,
    pub catalog: CatalogStore,
    pub fanout: Arc<SeatFanout>,
    pub booking: BookingService,
}

impl ServerState {
    /// 按配置打开两个存储并组装服务
    pub async fn initialize(config: Config) -> AppResult<Arc<Self>> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work dir: {e}")))?;

        let doc = DocStore::open(&config.doc_db_path().to_string_lossy()).await?;
        let catalog = CatalogStore::open(&config.catalog_db_path().to_string_lossy()).await?;

        let config = Arc::new(config);
        let fanout = Arc::new(SeatFanout::new(config.fanout_capacity));
        let booking = BookingService::new(
            config.clone(),
            doc.db.clone(),
            catalog.clone(),
            fanout.clone(),
        );

        Ok(Arc::new(Self {
            config,
            doc,
            catalog,
            fanout,
            booking,
        }))
    }

    /// 全内存状态（集成测试）
    pub async fn ephemeral() -> AppResult<Arc<Self>> {
        let doc = DocStore::memory().await?;
        let catalog = CatalogStore::memory().await?;

        let config = Arc::new(Config::default());
        let fanout = Arc::new(SeatFanout::new(config.fanout_capacity));
        let booking = BookingService::new(
            config.clone(),
            doc.db.clone(),
            catalog.clone(),
            fanout.clone(),
        );

        Ok(Arc::new(Self {
            config,
            doc,
            catalog,
            fanout,
            booking,
        }))
    }
}
