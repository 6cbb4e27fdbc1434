use serde::{Deserialize, Serialize};

// ==================== Seat Events ====================

/// 座位状态变更事件 (服务端 -> 客户端)
///
/// 投递语义为 at-most-once：无回放、无持久化，
/// 错过事件的客户端应重新拉取可用性快照。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SeatEvent {
    /// 座位被占用（新预订成功）
    ///
    /// 客户端收到后必须将这些座位从本地可选集中移除；
    /// 若与自己正在进行的选择冲突，需丢弃并提示冲突。
    SeatsTaken {
        /// 逻辑场次 ID（客户端订阅时使用的同一形式）
        showtime_id: String,
        /// 被占用的座位标签，如 ["A1", "A2"]
        seats: Vec<String>,
    },

    /// 座位被释放（pending 预订被取消）
    SeatsReleased {
        showtime_id: String,
        seats: Vec<String>,
    },
}

impl SeatEvent {
    /// 事件所属的逻辑场次 ID
    pub fn showtime_id(&self) -> &str {
        match self {
            Self::SeatsTaken { showtime_id, .. } => showtime_id,
            Self::SeatsReleased { showtime_id, .. } => showtime_id,
        }
    }

    /// 事件涉及的座位标签
    pub fn seats(&self) -> &[String] {
        match self {
            Self::SeatsTaken { seats, .. } => seats,
            Self::SeatsReleased { seats, .. } => seats,
        }
    }
}

// ==================== Client Messages ====================

/// 客户端订阅请求 (客户端 -> 服务端)
///
/// 通过 WebSocket 发送，加入/离开某个场次的座位频道。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SubscribeRequest {
    /// 加入场次频道
    JoinShowtime { showtime_id: String },
    /// 离开场次频道
    LeaveShowtime { showtime_id: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_event_roundtrip() {
        let event = SeatEvent::SeatsTaken {
            showtime_id: "sql_42".to_string(),
            seats: vec!["A1".to_string(), "A2".to_string()],
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"seats_taken\""));
        let back: SeatEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn join_request_parses_from_client_json() {
        let req: SubscribeRequest =
            serde_json::from_str(r#"{"action":"join_showtime","showtime_id":"showtime:x1"}"#)
                .unwrap();
        assert_eq!(
            req,
            SubscribeRequest::JoinShowtime {
                showtime_id: "showtime:x1".to_string()
            }
        );
    }
}
