//! Notification endpoint integration tests.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, TimeZone, Utc};
use common::TestHarness;
use serde_json::json;

use ledger_core::{Notification, NotificationId, UserId};
use ledger_store::{codec, Table, WriteItem};

fn seed_notification(harness: &TestHarness, user: &str, message: &str, millis: i64) {
    let notification = Notification {
        notification_id: NotificationId::generate(),
        user_id: UserId::new(user).unwrap(),
        message: message.into(),
        read: false,
        created_at: Utc.with_ymd_and_hms(2026, 2, 18, 18, 0, 0).unwrap()
            + Duration::milliseconds(millis),
    };
    harness
        .table
        .transact_write(vec![WriteItem::put(codec::notification_item(&notification))])
        .unwrap();
}

#[tokio::test]
async fn list_notifications_empty() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/v1/notifications")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn list_notifications_without_auth_fails() {
    let harness = TestHarness::new();

    let response = harness.server.get("/v1/notifications").await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn list_notifications_newest_first() {
    let harness = TestHarness::new();
    seed_notification(&harness, "user-1", "first", 0);
    seed_notification(&harness, "user-1", "second", 1);
    // Another user's notification must not leak into the listing.
    seed_notification(&harness, "user-2", "other", 2);

    let response = harness
        .server
        .get("/v1/notifications")
        .add_header("authorization", harness.user_auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["message"], "second");
    assert_eq!(items[1]["message"], "first");
}

#[tokio::test]
async fn notifications_and_transactions_do_not_mix() {
    let harness = TestHarness::new();
    seed_notification(&harness, "user-1", "hello", 0);

    harness
        .server
        .post("/v1/transactions")
        .add_header("authorization", harness.user_auth_header())
        .json(&json!({ "amount": 10 }))
        .await
        .assert_status(StatusCode::CREATED);

    let notifications = harness
        .server
        .get("/v1/notifications")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = notifications.json();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let transactions = harness
        .server
        .get("/v1/transactions")
        .add_header("authorization", harness.user_auth_header())
        .await;
    let body: serde_json::Value = transactions.json();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn list_notifications_paginates() {
    let harness = TestHarness::new();
    for i in 0..3 {
        seed_notification(&harness, "user-1", &format!("n{i}"), i);
    }

    let response = harness
        .server
        .get("/v1/notifications?limit=2")
        .add_header("authorization", harness.user_auth_header())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    let cursor = body["next_cursor"].as_str().expect("one page remains");
    let response = harness
        .server
        .get(&format!("/v1/notifications?limit=2&cursor={cursor}"))
        .add_header("authorization", harness.user_auth_header())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert!(body.get("next_cursor").is_none());
}
