//! Bot API client against a mock server.

use std::time::Duration;

use assert_matches::assert_matches;
use grocery_bot::notify::Notifier;
use grocery_bot::telegram::{TelegramApi, TelegramError};
use mockito::Matcher;
use serde_json::json;

fn client(server: &mockito::ServerGuard) -> TelegramApi {
    TelegramApi::new(&server.url(), "TEST", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn send_message_posts_chat_and_text() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/botTEST/sendMessage")
        .match_body(Matcher::PartialJson(json!({
            "chat_id": 42,
            "text": "hola"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "ok": true,
                "result": {
                    "message_id": 77,
                    "chat": { "id": 42, "type": "private" },
                    "date": 1700000000,
                    "text": "hola"
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let message = client(&server).send_message(42, "hola").await.unwrap();

    assert_eq!(message.message_id, 77);
    mock.assert_async().await;
}

#[tokio::test]
async fn api_errors_carry_telegram_description() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/botTEST/sendMessage")
        .with_status(403)
        .with_body(
            json!({
                "ok": false,
                "error_code": 403,
                "description": "Forbidden: bot was blocked by the user"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let result = client(&server).send_message(42, "hola").await;

    assert_matches!(
        result,
        Err(TelegramError::Api { status: 403, ref description })
            if description == "Forbidden: bot was blocked by the user"
    );
}

#[tokio::test]
async fn non_json_failure_keeps_raw_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/botTEST/getMe")
        .with_status(502)
        .with_body("Bad Gateway")
        .create_async()
        .await;

    let result = client(&server).get_me().await;

    assert_matches!(
        result,
        Err(TelegramError::Api { status: 502, ref description }) if description == "Bad Gateway"
    );
}

#[tokio::test]
async fn get_updates_parses_messages() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/botTEST/getUpdates")
        .match_body(Matcher::PartialJson(json!({ "offset": 10, "timeout": 30 })))
        .with_status(200)
        .with_body(
            json!({
                "ok": true,
                "result": [
                    {
                        "update_id": 10,
                        "message": {
                            "message_id": 1,
                            "from": { "id": 5, "is_bot": false, "first_name": "Ana" },
                            "chat": { "id": -100, "type": "supergroup" },
                            "date": 1700000000,
                            "text": "/list"
                        }
                    },
                    { "update_id": 11, "edited_message": { "message_id": 2 } }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let updates = client(&server)
        .get_updates(10, Duration::from_secs(30))
        .await
        .unwrap();

    assert_eq!(updates.len(), 2);
    let first = updates[0].message.as_ref().unwrap();
    assert_eq!(first.text.as_deref(), Some("/list"));
    assert!(!first.is_private());
    assert!(updates[1].message.is_none());
}

#[tokio::test]
async fn notifier_swallows_delivery_failures() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/botTEST/sendMessage")
        .with_status(400)
        .with_body(r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#)
        .create_async()
        .await;

    let api = client(&server);
    api.notify(99, "hello").await;

    mock.assert_async().await;
}
