//! WebSocket seat-event bridge
//!
//! One socket can watch several showtimes at once. Subscriptions are
//! plain JSON frames ([`SubscribeRequest`]); events go out as JSON
//! ([`SeatEvent`]). No replay, no acknowledgement — a client that
//! reconnects refetches the availability snapshot first.

use crate::core::ServerState;
use crate::realtime::SeatFanout;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::stream::StreamExt;
use futures::SinkExt;
use shared::{SeatEvent, SubscribeRequest};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// GET /api/ws/seats
pub async fn seat_socket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> Response {
    let fanout = state.fanout.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, fanout))
}

async fn handle_socket(socket: WebSocket, fanout: Arc<SeatFanout>) {
    let (mut sink, mut stream) = socket.split();
    // 每个房间一个转发任务，汇聚到单一 mpsc 后写出
    let (tx, mut rx) = mpsc::channel::<SeatEvent>(32);
    let mut rooms: HashMap<String, JoinHandle<()>> = HashMap::new();

    loop {
        tokio::select! {
            Some(event) = rx.recv() => {
                let Ok(text) = serde_json::to_string(&event) else {
                    continue;
                };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<SubscribeRequest>(&text) {
                            Ok(SubscribeRequest::JoinShowtime { showtime_id }) => {
                                join_room(&fanout, &mut rooms, &tx, showtime_id);
                            }
                            Ok(SubscribeRequest::LeaveShowtime { showtime_id }) => {
                                leave_room(&fanout, &mut rooms, &showtime_id);
                            }
                            Err(e) => {
                                tracing::debug!(error = %e, "ignoring malformed subscribe frame");
                            }
                        }
                    }
                    // ping/pong frames are answered by axum itself
                    Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Binary(_))) => {}
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                }
            }
        }
    }

    for (room, handle) in rooms {
        handle.abort();
        fanout.leave(&room);
    }
}

fn join_room(
    fanout: &Arc<SeatFanout>,
    rooms: &mut HashMap<String, JoinHandle<()>>,
    tx: &mpsc::Sender<SeatEvent>,
    showtime_id: String,
) {
    if rooms.contains_key(&showtime_id) {
        return;
    }
    let mut receiver = fanout.subscribe(&showtime_id);
    let tx = tx.clone();
    let room = showtime_id.clone();
    let handle = tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                // 消费过慢丢了事件：继续接收，客户端靠快照补偿
                Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(room = %room, missed, "seat event subscriber lagged");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
    rooms.insert(showtime_id, handle);
}

fn leave_room(
    fanout: &Arc<SeatFanout>,
    rooms: &mut HashMap<String, JoinHandle<()>>,
    showtime_id: &str,
) {
    if let Some(handle) = rooms.remove(showtime_id) {
        handle.abort();
        fanout.leave(showtime_id);
    }
}
