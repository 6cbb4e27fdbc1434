//! 服务配置
//!
//! 配置从环境变量读取（配合 .env），业务参数带有与线上一致的默认值。

use rust_decimal::Decimal;
use shared::TicketClass;
use std::path::{Path, PathBuf};

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录（数据库与日志都放在这里）
    pub work_dir: PathBuf,
    /// HTTP 服务端口
    pub http_port: u16,
    /// Environment (development/production)
    pub environment: String,
    /// 单笔预订最大座位数
    pub max_seats_per_booking: usize,
    /// VIP 票价倍率
    pub vip_multiplier: Decimal,
    /// Premium 票价倍率
    pub premium_multiplier: Decimal,
    /// 积分获取比例（按实付金额）
    pub loyalty_earn_rate: Decimal,
    /// 单个座位频道的广播缓冲容量
    pub fanout_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("./data"),
            http_port: 5000,
            environment: "development".to_string(),
            max_seats_per_booking: 8,
            vip_multiplier: Decimal::new(15, 1),      // 1.5
            premium_multiplier: Decimal::from(2),      // 2.0
            loyalty_earn_rate: Decimal::new(1, 2),     // 0.01
            fanout_capacity: 64,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            work_dir: std::env::var("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.http_port),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            max_seats_per_booking: std::env::var("MAX_SEATS_PER_BOOKING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_seats_per_booking),
            fanout_capacity: std::env::var("FANOUT_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fanout_capacity),
            vip_multiplier: defaults.vip_multiplier,
            premium_multiplier: defaults.premium_multiplier,
            loyalty_earn_rate: defaults.loyalty_earn_rate,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 票档对应的价格倍率
    pub fn class_multiplier(&self, class: TicketClass) -> Decimal {
        match class {
            TicketClass::Standard => Decimal::ONE,
            TicketClass::Vip => self.vip_multiplier,
            TicketClass::Premium => self.premium_multiplier,
        }
    }

    /// 文档库（预订账本）路径
    pub fn doc_db_path(&self) -> PathBuf {
        self.work_dir.join("db").join("ledger")
    }

    /// 关系目录库（SQLite）路径
    pub fn catalog_db_path(&self) -> PathBuf {
        self.work_dir.join("db").join("catalog.sqlite")
    }

    /// 日志目录
    pub fn log_dir(&self) -> PathBuf {
        self.work_dir.join("logs")
    }

    /// Create the work directory layout if missing
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        ensure_dir(&self.work_dir.join("db"))?;
        ensure_dir(&self.log_dir())?;
        Ok(())
    }
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.max_seats_per_booking, 8);
        assert_eq!(config.class_multiplier(TicketClass::Standard), Decimal::ONE);
        assert_eq!(
            config.class_multiplier(TicketClass::Vip),
            Decimal::new(15, 1)
        );
        assert_eq!(config.class_multiplier(TicketClass::Premium), Decimal::from(2));
    }

    #[test]
    fn paths_hang_off_work_dir() {
        let config = Config {
            work_dir: PathBuf::from("/tmp/cinema"),
            ..Config::default()
        };
        assert_eq!(config.catalog_db_path(), PathBuf::from("/tmp/cinema/db/catalog.sqlite"));
        assert_eq!(config.doc_db_path(), PathBuf::from("/tmp/cinema/db/ledger"));
    }
}
