//! HTTP surface: webhook secret check and health endpoint.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use grocery_bot::routes::app;
use grocery_bot::routes::webhook::SECRET_HEADER;
use grocery_bot::state::AppState;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{harness, Harness};

const SECRET: &str = "s3cret";
const USER: i64 = 321;

fn state(h: &Harness, secret: Option<&str>) -> AppState {
    AppState {
        pool: h.db.pool.clone(),
        dispatcher: Arc::clone(&h.dispatcher),
        webhook_secret: secret.map(Arc::from),
    }
}

fn update_body(text: &str) -> String {
    json!({
        "update_id": 11,
        "message": {
            "message_id": 1,
            "from": { "id": USER, "is_bot": false, "first_name": "Eva" },
            "chat": { "id": USER, "type": "private" },
            "date": 1700000000,
            "text": text
        }
    })
    .to_string()
}

fn webhook_request(secret: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json");
    if let Some(secret) = secret {
        builder = builder.header(SECRET_HEADER, secret);
    }
    builder.body(Body::from(body)).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn wrong_secret_is_rejected() {
    let h = harness().await;

    let response = app(state(&h, Some(SECRET)))
        .oneshot(webhook_request(Some("guess"), update_body("/help")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn secret_is_checked_before_the_body_is_parsed() {
    let h = harness().await;

    let response = app(state(&h, Some(SECRET)))
        .oneshot(webhook_request(None, "not json".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_update_with_valid_secret_is_bad_request() {
    let h = harness().await;

    let response = app(state(&h, Some(SECRET)))
        .oneshot(webhook_request(Some(SECRET), "{\"message\": 1}".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn missing_secret_is_rejected_when_configured() {
    let h = harness().await;

    let response = app(state(&h, Some(SECRET)))
        .oneshot(webhook_request(None, update_body("/help")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn accepted_update_is_processed_in_background() {
    let h = harness().await;

    let response = app(state(&h, Some(SECRET)))
        .oneshot(webhook_request(Some(SECRET), update_body("/frobnicate")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut replies = Vec::new();
    for _ in 0..50 {
        replies = h.notifier.sent_to(USER);
        if !replies.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(
        replies,
        vec!["Unknown command. Use /help to see available commands.".to_string()]
    );
}

#[tokio::test]
async fn no_secret_configured_accepts_any_caller() {
    let h = harness().await;

    let response = app(state(&h, None))
        .oneshot(webhook_request(None, update_body("/start")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_reports_database() {
    let h = harness().await;

    let response = app(state(&h, None))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
}
