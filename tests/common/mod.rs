//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use roster_engine::{App, RosterConfig};

pub const USERS_PATH: &str = "/users";

/// Start a mock server standing in for the user directory.
pub async fn start_users_mock() -> MockServer {
    MockServer::start().await
}

/// Serve `body` as the user list.
pub async fn mount_users(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Answer the next `times` requests with `status` and a text body.
pub async fn mount_status_once(server: &MockServer, status: u16, times: u64) {
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_string("upstream exploded"))
        .up_to_n_times(times)
        .mount(server)
        .await;
}

pub fn user_json(id: i64, name: &str, email: &str, company: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "email": email,
        "company": { "name": company }
    })
}

pub fn ervin() -> Value {
    user_json(1, "Ervin Howell", "Shanna@melissa.tv", "Deckow-Crist")
}

/// First three records of the public placeholder directory, with the extra
/// fields real responses carry.
pub fn sample_users() -> Value {
    json!([
        {
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": { "city": "Gwenborough" },
            "company": { "name": "Romaguera-Crona", "bs": "harness real-time e-markets" }
        },
        {
            "id": 2,
            "name": "Ervin Howell",
            "username": "Antonette",
            "email": "Shanna@melissa.tv",
            "company": { "name": "Deckow-Crist" }
        },
        {
            "id": 3,
            "name": "Clementine Bauch",
            "username": "Samantha",
            "email": "Nathan@yesenia.net",
            "company": { "name": "Romaguera-Jacobson" }
        }
    ])
}

/// An app wired to `server`, not yet started.
pub fn app_for(server: &MockServer) -> App {
    let mut config = RosterConfig::default();
    config.override_url(format!("{}{USERS_PATH}", server.uri()));
    App::new(&config).expect("http client builds")
}

/// Pump completions until the screen leaves `Loading`.
pub async fn settle(app: &mut App) {
    for _ in 0..1000 {
        app.process_fetch_events();
        if !app.is_loading() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("fetch did not settle");
}

/// Start `app` and wait for the first fetch to land.
pub async fn start_and_settle(app: &mut App) {
    app.start();
    settle(app).await;
}
