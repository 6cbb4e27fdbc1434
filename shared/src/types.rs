//! 订座业务的共享枚举类型
//!
//! 这些类型在 booking-server 和 clients 之间共享，序列化格式
//! 与 HTTP API 和数据库存储保持一致（小写字符串）。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 票档 - 决定票价倍率
///
/// 倍率本身是服务端配置项（见 `Config`），不是模型不变量。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketClass {
    /// 标准票 (×1)
    #[default]
    Standard,
    /// VIP 票 (×1.5)
    Vip,
    /// 高级票 (×2)
    Premium,
}

impl fmt::Display for TicketClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Vip => write!(f, "vip"),
            Self::Premium => write!(f, "premium"),
        }
    }
}

/// 预订生命周期状态
///
/// pending → paid → completed，或 pending → cancelled。
/// 座位占用判定只看 pending 和 paid。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Paid,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Whether a reservation in this status holds its seats
    pub fn holds_seats(&self) -> bool {
        matches!(self, Self::Pending | Self::Paid)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// 支付方式 - 支付本身为模拟（状态标记），不对接网关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Banking,
    Wallet,
}

/// 套餐加购（爆米花 / 饮料）
///
/// `addon_price` 是客户端已计算好的加购总价，服务端按原样计入总额。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AddonSelection {
    /// 爆米花数量
    #[serde(default)]
    pub popcorn: u32,
    /// 饮料数量
    #[serde(default)]
    pub drink: u32,
    /// 加购总价 (VND)
    #[serde(default)]
    pub addon_price: i64,
}
