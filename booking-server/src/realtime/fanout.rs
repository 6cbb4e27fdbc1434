//! Seat event fanout
//!
//! Per-showtime broadcast channels keyed by logical showtime id, plus a
//! firehose carrying every event. The fanout is plain state injected
//! through the server — handlers receive it, nothing reaches for a
//! global.
//!
//! 投递语义 at-most-once：慢消费者会丢事件（broadcast lagged），
//! 客户端以重新拉取可用性快照的方式补偿。

use dashmap::DashMap;
use shared::SeatEvent;
use tokio::sync::broadcast;

pub struct SeatFanout {
    capacity: usize,
    rooms: DashMap<String, broadcast::Sender<SeatEvent>>,
    firehose: broadcast::Sender<SeatEvent>,
}

impl SeatFanout {
    pub fn new(capacity: usize) -> Self {
        let (firehose, _) = broadcast::channel(capacity);
        Self {
            capacity,
            rooms: DashMap::new(),
            firehose,
        }
    }

    /// Subscribe to one showtime's seat events.
    ///
    /// No replay: only events published after this call are seen.
    pub fn subscribe(&self, showtime_id: &str) -> broadcast::Receiver<SeatEvent> {
        self.rooms
            .entry(showtime_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Drop a showtime's channel once its last subscriber is gone.
    ///
    /// The receiver itself is dropped by the caller; this just reclaims
    /// the map entry so idle showtimes don't accumulate.
    pub fn leave(&self, showtime_id: &str) {
        self.rooms
            .remove_if(showtime_id, |_, tx| tx.receiver_count() == 0);
    }

    /// Publish an event to its showtime channel and the firehose.
    ///
    /// Returns the number of room subscribers it reached. Zero is
    /// normal — nobody watching means nothing to deliver.
    pub fn publish(&self, event: SeatEvent) -> usize {
        let delivered = self
            .rooms
            .get(event.showtime_id())
            .map(|tx| tx.send(event.clone()).unwrap_or(0))
            .unwrap_or(0);
        let _ = self.firehose.send(event);
        delivered
    }

    /// Subscribe to every seat event regardless of showtime
    pub fn watch_all(&self) -> broadcast::Receiver<SeatEvent> {
        self.firehose.subscribe()
    }

    #[cfg(test)]
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taken(showtime: &str, seats: &[&str]) -> SeatEvent {
        SeatEvent::SeatsTaken {
            showtime_id: showtime.to_string(),
            seats: seats.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn delivers_to_room_subscribers() {
        let fanout = SeatFanout::new(8);
        let mut rx = fanout.subscribe("sql_1");

        let delivered = fanout.publish(taken("sql_1", &["A1"]));
        assert_eq!(delivered, 1);
        assert_eq!(rx.recv().await.unwrap(), taken("sql_1", &["A1"]));
    }

    #[tokio::test]
    async fn rooms_are_isolated() {
        let fanout = SeatFanout::new(8);
        let mut other = fanout.subscribe("sql_2");

        fanout.publish(taken("sql_1", &["A1"]));
        assert!(matches!(
            other.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn no_replay_for_late_joiners() {
        let fanout = SeatFanout::new(8);
        let _early = fanout.subscribe("sql_1");
        fanout.publish(taken("sql_1", &["A1"]));

        let mut late = fanout.subscribe("sql_1");
        assert!(matches!(
            late.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_zero_not_error() {
        let fanout = SeatFanout::new(8);
        assert_eq!(fanout.publish(taken("sql_9", &["Z9"])), 0);
    }

    #[tokio::test]
    async fn leave_reclaims_idle_rooms() {
        let fanout = SeatFanout::new(8);
        let rx = fanout.subscribe("sql_1");
        fanout.leave("sql_1");
        // still subscribed, must not be reclaimed
        assert_eq!(fanout.room_count(), 1);

        drop(rx);
        fanout.leave("sql_1");
        assert_eq!(fanout.room_count(), 0);
    }

    #[tokio::test]
    async fn firehose_sees_everything() {
        let fanout = SeatFanout::new(8);
        let mut all = fanout.watch_all();
        fanout.publish(taken("sql_1", &["A1"]));
        fanout.publish(taken("sql_2", &["B2"]));
        assert_eq!(all.recv().await.unwrap().showtime_id(), "sql_1");
        assert_eq!(all.recv().await.unwrap().showtime_id(), "sql_2");
    }
}
