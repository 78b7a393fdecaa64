//! End-to-end cycles against mocked review API and Telegram Bot API servers.

use std::time::Duration;

use mockito::{Matcher, ServerGuard};
use serde_json::json;

use homework_status_bot::config::{CursorPolicy, PollerSettings};
use homework_status_bot::homework::{ApiClient, HomeworkStatus, NO_UPDATES_MESSAGE, status_message};
use homework_status_bot::scheduler::{FAILURE_PREFIX, LoopState, StatusPoller};
use homework_status_bot::telegram::TelegramNotifier;

const API_PATH: &str = "/api/user_api/homework_statuses/";
const BOT_TOKEN: &str = "test_bot_token_12345";
const CHAT_ID: i64 = 424_242;

const SENT_MESSAGE: &str = r#"{
    "ok": true,
    "result": {
        "message_id": 1,
        "date": 1706529600,
        "chat": {"id": 424242, "type": "private"},
        "from": {"id": 123456789, "is_bot": true, "first_name": "TestBot", "username": "testbot"},
        "text": "ok"
    }
}"#;

fn build_poller(
    server: &ServerGuard,
    settings: &PollerSettings,
) -> StatusPoller<ApiClient, TelegramNotifier> {
    let source = ApiClient::new(
        format!("{}{API_PATH}", server.url()),
        "practicum-token",
        Duration::from_secs(5),
    )
    .unwrap();
    let notifier = TelegramNotifier::new(BOT_TOKEN, &CHAT_ID.to_string())
        .with_api_url(reqwest::Url::parse(&server.url()).unwrap());
    StatusPoller::new(source, notifier, settings)
}

/// Teloxide names the method `SendMessage`; match the path case-insensitively.
fn send_message_path() -> Matcher {
    Matcher::Regex(format!("(?i)^/bot{BOT_TOKEN}/sendmessage$"))
}

async fn expect_send(server: &mut ServerGuard, text: &str, hits: usize) -> mockito::Mock {
    server
        .mock("POST", send_message_path())
        .match_body(Matcher::PartialJson(json!({"chat_id": CHAT_ID, "text": text})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SENT_MESSAGE)
        .expect(hits)
        .create_async()
        .await
}

#[tokio::test]
async fn test_status_change_reaches_chat_once() {
    let mut server = mockito::Server::new_async().await;
    let api = server
        .mock("GET", API_PATH)
        .match_header("authorization", "OAuth practicum-token")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "homeworks": [{"homework_name": "sprint_7", "status": "approved"}],
                "current_date": 1_700_000_000
            })
            .to_string(),
        )
        .expect(2)
        .create_async()
        .await;
    let expected = status_message("sprint_7", HomeworkStatus::Approved);
    let send = expect_send(&mut server, &expected, 1).await;

    let poller = build_poller(&server, &PollerSettings::default());
    let state = poller.run_cycle(LoopState::new()).await.unwrap();
    let state = poller.run_cycle(state).await.unwrap();

    assert_eq!(state.cursor, 1_700_000_000);
    assert_eq!(state.last_status.as_deref(), Some(expected.as_str()));
    api.assert_async().await;
    send.assert_async().await;
}

#[tokio::test]
async fn test_empty_period_sends_no_updates_sentence() {
    let mut server = mockito::Server::new_async().await;
    let _api = server
        .mock("GET", API_PATH)
        .match_query(Matcher::UrlEncoded("from_date".into(), "0".into()))
        .with_status(200)
        .with_body(r#"{"homeworks": [], "current_date": 77}"#)
        .create_async()
        .await;
    let send = expect_send(&mut server, NO_UPDATES_MESSAGE, 1).await;

    let poller = build_poller(&server, &PollerSettings::default());
    let state = poller.run_cycle(LoopState::new()).await.unwrap();

    assert_eq!(state.cursor, 77);
    send.assert_async().await;
}

#[tokio::test]
async fn test_repeated_api_failure_reaches_chat_once() {
    let mut server = mockito::Server::new_async().await;
    let _api = server
        .mock("GET", API_PATH)
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("down")
        .create_async()
        .await;
    let send = server
        .mock("POST", send_message_path())
        .match_body(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(SENT_MESSAGE)
        .expect(1)
        .create_async()
        .await;

    let poller = build_poller(&server, &PollerSettings::default());
    let state = poller.run_cycle(LoopState::new()).await.unwrap();
    let state = poller.run_cycle(state).await.unwrap();

    let reported = state.last_error.unwrap();
    assert!(reported.starts_with(FAILURE_PREFIX));
    assert!(reported.contains("status_code: 500"));
    assert_eq!(state.cursor, 0);
    send.assert_async().await;
}

#[tokio::test]
async fn test_local_only_failure_is_not_relayed() {
    let mut server = mockito::Server::new_async().await;
    let _api = server
        .mock("GET", API_PATH)
        .match_query(Matcher::Any)
        .with_status(502)
        .create_async()
        .await;
    let send = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let settings = PollerSettings::from_lookup(|key| {
        (key == "LOCAL_ONLY_ERRORS").then(|| "bad_status".to_owned())
    })
    .unwrap();
    let poller = build_poller(&server, &settings);
    let state = poller.run_cycle(LoopState::new()).await.unwrap();

    assert!(state.last_error.is_none());
    send.assert_async().await;
}

#[tokio::test]
async fn test_from_epoch_policy_always_requests_from_zero() {
    let mut server = mockito::Server::new_async().await;
    let api = server
        .mock("GET", API_PATH)
        .match_query(Matcher::UrlEncoded("from_date".into(), "0".into()))
        .with_status(200)
        .with_body(r#"{"homeworks": [], "current_date": 500}"#)
        .expect(2)
        .create_async()
        .await;
    let _send = expect_send(&mut server, NO_UPDATES_MESSAGE, 1).await;

    let settings = PollerSettings {
        cursor_policy: CursorPolicy::FromEpoch,
        ..PollerSettings::default()
    };
    let poller = build_poller(&server, &settings);
    let state = poller.run_cycle(LoopState::new()).await.unwrap();
    poller.run_cycle(state).await.unwrap();

    api.assert_async().await;
}
