//! HTTP 层集成测试
//!
//! 通过 `tower::ServiceExt::oneshot` 直接打路由，验证响应信封、
//! 错误码与鉴权行为。

use axum::Router;
use axum::body::Body;
use booking_server::api;
use booking_server::core::ServerState;
use http::{Request, StatusCode, header};
use std::sync::Arc;
use tower::ServiceExt;

async fn seeded_app() -> Router {
    let state = ServerState::ephemeral().await.unwrap();
    sqlx::query("INSERT INTO movies (title, duration) VALUES ('Dune III', 155)")
        .execute(&state.catalog.pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO theaters (name, address, city) VALUES ('Galaxy Central', '1 Main St', 'HCMC')")
        .execute(&state.catalog.pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO showtimes (movie_id, theater_id, show_date, show_time, price, total_seats, available_seats) \
         VALUES (1, 1, '2026-09-01', '19:30', 100000, 100, 100)",
    )
    .execute(&state.catalog.pool)
    .await
    .unwrap();
    api::build_app(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn booking_request(user: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/bookings")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-user-id", user)
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok_envelope() {
    let app = seeded_app().await;
    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["code"], "E0000");
    assert_eq!(json["data"]["status"], "ok");
}

#[tokio::test]
async fn booking_requires_caller_identity() {
    let app = seeded_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/bookings")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"showtime_id":"sql_1","seats":["A1"]}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "E3001");
}

#[tokio::test]
async fn booking_then_availability_round_trip() {
    let app = seeded_app().await;

    let body = serde_json::json!({
        "showtime_id": "sql_1",
        "seats": ["A1", "A2"],
        "ticket_class": "vip"
    });
    let response = app
        .clone()
        .oneshot(booking_request("alice", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["code"], "E0000");
    assert_eq!(json["data"]["total_price"], 300000);
    assert_eq!(json["data"]["status"], "pending");
    assert!(json["data"]["booking_code"].as_str().unwrap().starts_with("BK"));

    let response = app
        .oneshot(
            Request::get("/api/showtimes/sql_1/availability")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["data"]["taken_seats"], serde_json::json!(["A1", "A2"]));
    assert_eq!(json["data"]["available_seats"], 98);
}

#[tokio::test]
async fn seat_conflict_is_409_with_conflicting_labels() {
    let app = seeded_app().await;

    let body = serde_json::json!({ "showtime_id": "sql_1", "seats": ["A3", "A4"] });
    app.clone()
        .oneshot(booking_request("alice", &body))
        .await
        .unwrap();

    let body = serde_json::json!({ "showtime_id": "sql_1", "seats": ["A4", "B1"] });
    let response = app
        .oneshot(booking_request("bob", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(response).await;
    assert_eq!(json["code"], "E0103");
    assert_eq!(json["data"]["conflictSeats"], serde_json::json!(["A4"]));
}

#[tokio::test]
async fn payment_and_cancellation_enforce_the_state_machine() {
    let app = seeded_app().await;

    let body = serde_json::json!({ "showtime_id": "sql_1", "seats": ["C1"] });
    let response = app
        .clone()
        .oneshot(booking_request("alice", &body))
        .await
        .unwrap();
    let id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // 取消后不能再支付
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/bookings/{id}"))
                .header("x-user-id", "alice")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "cancelled");

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/bookings/{id}/payment"))
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-user-id", "alice")
                .body(Body::from(r#"{"method":"card"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "E0105");
}

#[tokio::test]
async fn unknown_showtime_is_404() {
    let app = seeded_app().await;
    let response = app
        .oneshot(
            Request::get("/api/showtimes/sql_999/availability")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "E0003");
}
