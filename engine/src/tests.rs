use std::collections::VecDeque;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use reqwest::StatusCode;
use roster_providers::FetchFut;
use tokio::sync::oneshot;

use super::*;

type Outcome = Result<Vec<User>, FetchError>;

/// Replays canned outcomes in call order.
#[derive(Default)]
struct ScriptedSource {
    outcomes: Mutex<VecDeque<Outcome>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(outcomes: Vec<Outcome>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl UserSource for ScriptedSource {
    fn fetch_users(&self) -> FetchFut {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        Box::pin(async move { outcome })
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

/// Each fetch waits on a gate the test resolves.
struct GatedSource {
    gates: Mutex<VecDeque<oneshot::Receiver<Outcome>>>,
}

impl UserSource for GatedSource {
    fn fetch_users(&self) -> FetchFut {
        let gate = self.gates.lock().unwrap().pop_front().expect("gate per call");
        Box::pin(async move {
            gate.await
                .unwrap_or_else(|_| Ok(Vec::new()))
        })
    }

    fn describe(&self) -> String {
        "gated".to_string()
    }
}

fn sample() -> Vec<User> {
    vec![
        User::new(1, "Leanne Graham", "Sincere@april.biz", "Romaguera-Crona"),
        User::new(2, "Ervin Howell", "Shanna@melissa.tv", "Deckow-Crist"),
        User::new(3, "Clementine Bauch", "Nathan@yesenia.net", "Romaguera-Jacobson"),
    ]
}

fn server_error() -> FetchError {
    FetchError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: String::new(),
    }
}

/// Collects formatted log output for the current thread.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn capture_logs() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    (capture, tracing::subscriber::set_default(subscriber))
}

async fn settle(app: &mut App) {
    for _ in 0..500 {
        app.process_fetch_events();
        if !app.is_loading() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("fetch did not settle");
}

#[tokio::test]
async fn start_loads_users() {
    let source = ScriptedSource::new(vec![Ok(sample())]);
    let mut app = App::with_source(source.clone(), UiOptions::default());
    assert!(app.is_loading());

    app.start();
    settle(&mut app).await;

    assert_eq!(app.phase(), Phase::Loaded);
    assert_eq!(app.users(), sample().as_slice());
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn rows_have_one_entry_per_user_with_unique_keys() {
    let source = ScriptedSource::new(vec![Ok(sample())]);
    let mut app = App::with_source(source, UiOptions::default());
    app.start();
    settle(&mut app).await;

    let rows = app.rows();
    assert_eq!(rows.len(), 3);
    let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["1", "2", "3"]);
    assert!(rows[0].highlighted);
    assert!(rows.iter().all(|r| !r.selected));

    assert_eq!(rows[1].title, "Ervin Howell");
    assert_eq!(rows[1].subtitle, "Shanna@melissa.tv");
    assert_eq!(rows[1].company, "Deckow-Crist");
}

#[tokio::test]
async fn failure_then_retry_then_success() {
    let source = ScriptedSource::new(vec![Err(server_error()), Ok(sample())]);
    let mut app = App::with_source(source.clone(), UiOptions::default());

    app.start();
    settle(&mut app).await;
    assert_eq!(app.phase(), Phase::Failed);
    assert_eq!(
        app.error_message(),
        Some("Failed to load data (HTTP 500 Internal Server Error)")
    );
    assert!(app.rows().is_empty());

    assert!(app.retry());
    assert!(app.is_loading());
    settle(&mut app).await;

    assert_eq!(app.phase(), Phase::Loaded);
    assert_eq!(app.users().len(), 3);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn retry_is_ignored_unless_failed() {
    let source = ScriptedSource::new(vec![Ok(sample())]);
    let mut app = App::with_source(source.clone(), UiOptions::default());
    app.start();
    assert!(!app.retry(), "retry while loading");
    settle(&mut app).await;
    assert!(!app.retry(), "retry while loaded");
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn superseded_fetch_never_lands() {
    let (first_tx, first_rx) = oneshot::channel();
    let (second_tx, second_rx) = oneshot::channel();
    let source = Arc::new(GatedSource {
        gates: Mutex::new(VecDeque::from([first_rx, second_rx])),
    });
    let mut app = App::with_source(source, UiOptions::default());

    app.start();
    app.start();

    // The first task was aborted, so its gate may already be closed.
    let _ = first_tx.send(Ok(vec![User::new(42, "Stale", "stale@x", "Old Co")]));
    tokio::time::sleep(Duration::from_millis(10)).await;
    app.process_fetch_events();
    assert!(app.is_loading());

    second_tx.send(Ok(sample())).unwrap();
    settle(&mut app).await;
    assert_eq!(app.users(), sample().as_slice());
}

#[tokio::test]
async fn live_failure_is_logged() {
    let source = ScriptedSource::new(vec![Err(server_error())]);
    let mut app = App::with_source(source, UiOptions::default());
    let (logs, _guard) = capture_logs();

    app.start();
    settle(&mut app).await;

    assert_eq!(app.phase(), Phase::Failed);
    let text = logs.text();
    assert!(text.contains("User fetch failed"), "{text}");
}

#[tokio::test]
async fn superseded_failure_is_not_logged_as_failure() {
    let source = ScriptedSource::new(vec![Err(server_error()), Ok(sample())]);
    let mut app = App::with_source(source, UiOptions::default());
    let (logs, _guard) = capture_logs();

    app.start();
    // Let the first attempt finish and queue its failure before restarting.
    tokio::time::sleep(Duration::from_millis(10)).await;
    app.start();
    settle(&mut app).await;

    assert_eq!(app.phase(), Phase::Loaded);
    assert_eq!(app.users(), sample().as_slice());
    let text = logs.text();
    assert!(!text.contains("User fetch failed"), "{text}");
    assert!(text.contains("Discarding stale fetch completion"), "{text}");
}

#[tokio::test]
async fn selecting_a_row_keeps_list_and_phase() {
    let source = ScriptedSource::new(vec![Ok(sample())]);
    let mut app = App::with_source(source, UiOptions::default());
    app.start();
    settle(&mut app).await;

    app.select_row(1).unwrap();
    assert_eq!(app.selected().map(|u| u.name.as_str()), Some("Ervin Howell"));
    assert_eq!(app.cursor().highlighted(), 1);
    assert_eq!(app.phase(), Phase::Loaded);
    assert_eq!(app.users(), sample().as_slice());

    let rows = app.rows();
    assert!(rows[1].selected && rows[1].highlighted);
    assert!(!rows[0].selected);
}

#[tokio::test]
async fn select_highlighted_follows_navigation() {
    let source = ScriptedSource::new(vec![Ok(sample())]);
    let mut app = App::with_source(source, UiOptions::default());
    app.start();
    settle(&mut app).await;

    app.move_down();
    app.move_down();
    app.move_down();
    assert_eq!(app.cursor().highlighted(), 2);
    assert!(app.select_highlighted());
    assert_eq!(app.selected().map(|u| u.id), Some(UserId::new(3)));

    app.home();
    app.select_user(&sample()[0]).unwrap();
    assert_eq!(app.selected().map(|u| u.id), Some(UserId::new(1)));
}

#[tokio::test]
async fn empty_list_is_loaded_and_unselectable() {
    let source = ScriptedSource::new(vec![Ok(Vec::new())]);
    let mut app = App::with_source(source, UiOptions::default());
    app.start();
    settle(&mut app).await;

    assert_eq!(app.phase(), Phase::Loaded);
    assert!(app.rows().is_empty());
    assert!(!app.select_highlighted());
    assert!(app.selected().is_none());
}

#[tokio::test]
async fn select_outside_loaded_is_rejected() {
    let source = ScriptedSource::new(vec![Err(server_error())]);
    let mut app = App::with_source(source, UiOptions::default());
    app.start();
    settle(&mut app).await;

    assert_eq!(app.select_row(0), Err(SelectError::NotLoaded));
    assert!(!app.select_highlighted());
}

#[tokio::test]
async fn rows_in_returns_visible_window() {
    let source = ScriptedSource::new(vec![Ok(sample())]);
    let mut app = App::with_source(source, UiOptions::default());
    app.start();
    settle(&mut app).await;

    app.set_visible_rows(2);
    app.end();
    let cursor = app.cursor();
    assert_eq!(cursor.offset(), 1);

    let window = app.rows_in(cursor.offset(), cursor.page());
    let keys: Vec<&str> = window.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, vec!["2", "3"]);
    assert!(window[1].highlighted);
}

#[tokio::test]
async fn rows_sanitize_remote_text() {
    let source = ScriptedSource::new(vec![Ok(vec![User::new(
        1,
        "Evil\x1b]52;c;AAAA\x07 Name",
        "a@b\nc",
        "Co\x1b[31m",
    )])]);
    let mut app = App::with_source(source, UiOptions::default());
    app.start();
    settle(&mut app).await;

    let row = &app.rows()[0];
    assert_eq!(row.title, "Evil Name");
    assert_eq!(row.subtitle, "a@b c");
    assert_eq!(row.company, "Co");
}

#[test]
fn quit_flag() {
    let source = ScriptedSource::new(Vec::new());
    let mut app = App::with_source(source, UiOptions::default());
    assert!(!app.should_quit());
    app.request_quit();
    assert!(app.should_quit());
}
