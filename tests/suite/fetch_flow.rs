//! End-to-end fetch scenarios against a mock user directory.

use serde_json::json;

use roster_engine::{Phase, ScreenState};

use crate::common::{
    USERS_PATH, app_for, ervin, mount_status_once, mount_users, sample_users, settle,
    start_and_settle, start_users_mock, user_json,
};

#[tokio::test]
async fn single_record_becomes_one_row() {
    let server = start_users_mock().await;
    mount_users(&server, json!([ervin()])).await;

    let mut app = app_for(&server);
    assert_eq!(app.phase(), Phase::Loading);
    start_and_settle(&mut app).await;

    assert_eq!(app.phase(), Phase::Loaded);
    let rows = app.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].key, "1");
    assert_eq!(rows[0].title, "Ervin Howell");
    assert_eq!(rows[0].subtitle, "Shanna@melissa.tv");
    assert_eq!(rows[0].company, "Deckow-Crist");
}

#[tokio::test]
async fn full_payload_keeps_order_and_ignores_extra_fields() {
    let server = start_users_mock().await;
    mount_users(&server, sample_users()).await;

    let mut app = app_for(&server);
    start_and_settle(&mut app).await;

    let names: Vec<&str> = app.users().iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Leanne Graham", "Ervin Howell", "Clementine Bauch"]);
    let keys: Vec<String> = app.rows().into_iter().map(|r| r.key).collect();
    assert_eq!(keys, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn server_error_then_retry_reissues_the_same_get() {
    let server = start_users_mock().await;
    mount_status_once(&server, 500, 1).await;
    mount_users(&server, sample_users()).await;

    let mut app = app_for(&server);
    start_and_settle(&mut app).await;

    assert_eq!(app.phase(), Phase::Failed);
    let message = app.error_message().unwrap_or_default();
    assert!(message.starts_with("Failed to load data"), "{message}");
    assert!(message.contains("500"), "{message}");
    assert!(app.users().is_empty());

    assert!(app.retry());
    assert_eq!(app.phase(), Phase::Loading);
    settle(&mut app).await;

    assert_eq!(app.phase(), Phase::Loaded);
    assert_eq!(app.users().len(), 3);
    assert!(app.error_message().is_none());

    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(request.method.as_str(), "GET");
        assert_eq!(request.url.path(), USERS_PATH);
        assert!(request.url.query().is_none());
        assert!(request.body.is_empty());
    }
}

#[tokio::test]
async fn empty_array_is_loaded_with_no_rows() {
    let server = start_users_mock().await;
    mount_users(&server, json!([])).await;

    let mut app = app_for(&server);
    start_and_settle(&mut app).await;

    assert_eq!(app.phase(), Phase::Loaded);
    assert!(app.rows().is_empty());
    assert!(matches!(
        app.screen().state(),
        ScreenState::Loaded(loaded) if loaded.users().is_empty()
    ));
}

#[tokio::test]
async fn malformed_record_fails_naming_the_record() {
    let server = start_users_mock().await;
    mount_users(
        &server,
        json!([ervin(), { "id": 2, "name": "No Email", "company": { "name": "X" } }]),
    )
    .await;

    let mut app = app_for(&server);
    start_and_settle(&mut app).await;

    assert_eq!(app.phase(), Phase::Failed);
    let message = app.error_message().unwrap_or_default();
    assert!(message.contains("malformed"), "{message}");
    assert!(message.contains("record 1"), "{message}");
}

#[tokio::test]
async fn duplicate_ids_fail() {
    let server = start_users_mock().await;
    mount_users(
        &server,
        json!([ervin(), user_json(1, "Twin", "twin@example.test", "Copy Co")]),
    )
    .await;

    let mut app = app_for(&server);
    start_and_settle(&mut app).await;

    assert_eq!(app.phase(), Phase::Failed);
    let message = app.error_message().unwrap_or_default();
    assert!(message.contains("share id 1"), "{message}");
}

#[tokio::test]
async fn non_array_body_fails() {
    let server = start_users_mock().await;
    mount_users(&server, json!({ "users": [] })).await;

    let mut app = app_for(&server);
    start_and_settle(&mut app).await;

    assert_eq!(app.phase(), Phase::Failed);
    assert!(app.retry(), "error view offers retry");
}

#[tokio::test]
async fn phase_changes_are_observable() {
    let server = start_users_mock().await;
    mount_users(&server, json!([ervin()])).await;

    let mut app = app_for(&server);
    let mut phases = app.screen().subscribe();
    assert_eq!(*phases.borrow_and_update(), Phase::Loading);

    start_and_settle(&mut app).await;
    assert!(phases.has_changed().unwrap_or(false));
    assert_eq!(*phases.borrow_and_update(), Phase::Loaded);
}
