//! Core engine for Roster - state machine and orchestration.
//!
//! This crate contains the App without TUI dependencies. The TUI reads state
//! through accessors and [`App::rows`], and drives it through the operations
//! below; it never touches [`UserListScreen`] directly.

mod cursor;
mod screen;

use std::{fmt, sync::Arc};

use tokio::{sync::mpsc, task::JoinHandle};

pub use cursor::ListCursor;
pub use roster_config::RosterConfig;
pub use roster_providers::{FetchError, FetchFut, HttpSettings, HttpUserSource, UserSource};
pub use roster_types::{UiOptions, User, UserId, sanitize_display_line};
pub use screen::{
    Completion, FetchTicket, LoadedState, Phase, ScreenState, SelectError, UserListScreen,
};

/// Outcome of one spawned fetch, tagged with the ticket it was issued under.
#[derive(Debug)]
struct FetchCompletion {
    ticket: FetchTicket,
    outcome: Result<Vec<User>, FetchError>,
}

/// One rendered list row. `key` is the user id as a string and is unique
/// within a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub key: String,
    pub title: String,
    pub subtitle: String,
    pub company: String,
    pub highlighted: bool,
    pub selected: bool,
}

impl RowView {
    fn from_user(user: &User, highlighted: bool, selected: bool) -> Self {
        Self {
            key: user.id.key(),
            title: sanitize_display_line(&user.name).into_owned(),
            subtitle: sanitize_display_line(&user.email).into_owned(),
            company: sanitize_display_line(user.company_name()).into_owned(),
            highlighted,
            selected,
        }
    }
}

pub struct App {
    screen: UserListScreen,
    source: Arc<dyn UserSource>,
    completions_tx: mpsc::UnboundedSender<FetchCompletion>,
    completions_rx: mpsc::UnboundedReceiver<FetchCompletion>,
    in_flight: Option<JoinHandle<()>>,
    cursor: ListCursor,
    ui_options: UiOptions,
    tick: usize,
    should_quit: bool,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("screen", &self.screen)
            .field("source", &self.source.describe())
            .field("cursor", &self.cursor)
            .field("ui_options", &self.ui_options)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Build an app that fetches from the configured HTTP endpoint.
    pub fn new(config: &RosterConfig) -> Result<Self, reqwest::Error> {
        let settings = HttpSettings {
            timeout: config.request_timeout(),
            connect_timeout: config.connect_timeout(),
        };
        let source = HttpUserSource::new(config.users_url(), settings)?;
        Ok(Self::with_source(Arc::new(source), config.ui_options()))
    }

    pub fn with_source(source: Arc<dyn UserSource>, ui_options: UiOptions) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            screen: UserListScreen::new(),
            source,
            completions_tx,
            completions_rx,
            in_flight: None,
            cursor: ListCursor::default(),
            ui_options,
            tick: 0,
            should_quit: false,
        }
    }

    /// Mount: enter `Loading` and issue the fetch. Must run inside a tokio runtime.
    pub fn start(&mut self) {
        let ticket = self.screen.start();
        self.spawn_fetch(ticket);
    }

    /// Re-issue the fetch from the error view. Returns `false` (no-op) unless
    /// the screen is `Failed`.
    pub fn retry(&mut self) -> bool {
        match self.screen.retry() {
            Some(ticket) => {
                tracing::info!(ticket = ticket.generation(), "Retrying user fetch");
                self.spawn_fetch(ticket);
                true
            }
            None => false,
        }
    }

    fn spawn_fetch(&mut self, ticket: FetchTicket) {
        if let Some(previous) = self.in_flight.take()
            && !previous.is_finished()
        {
            tracing::debug!("Aborting superseded fetch");
            previous.abort();
        }

        tracing::info!(
            ticket = ticket.generation(),
            source = %self.source.describe(),
            "Fetching users"
        );
        let fetch = self.source.fetch_users();
        let tx = self.completions_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = fetch.await;
            // Receiver gone means the app is shutting down.
            let _ = tx.send(FetchCompletion { ticket, outcome });
        }));
    }

    /// Apply every completion that has arrived since the last call.
    pub fn process_fetch_events(&mut self) {
        while let Ok(FetchCompletion { ticket, outcome }) = self.completions_rx.try_recv() {
            let (outcome, error) = match outcome {
                Ok(users) => (Ok(users), None),
                Err(err) => (Err(err.user_message()), Some(err)),
            };
            match self.screen.complete(ticket, outcome) {
                Completion::Loaded(count) => {
                    tracing::info!(ticket = ticket.generation(), users = count, "Users loaded");
                    self.cursor.reset();
                }
                Completion::Failed => {
                    if let Some(err) = error {
                        tracing::warn!(
                            ticket = ticket.generation(),
                            error = %err,
                            "User fetch failed"
                        );
                    }
                }
                Completion::Stale => {}
            }
        }
    }

    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.tick
    }

    // ------------------------------------------------------------------
    // Selection and navigation
    // ------------------------------------------------------------------

    /// Select the row at `index` and move the highlight onto it.
    pub fn select_row(&mut self, index: usize) -> Result<(), SelectError> {
        let user = self.screen.select_index(index)?;
        tracing::debug!(id = %user.id, "User selected");
        let len = self.screen.users().len();
        self.cursor.set(index, len);
        Ok(())
    }

    pub fn select_user(&mut self, user: &User) -> Result<(), SelectError> {
        self.screen.select(user)?;
        if let Some(index) = self.screen.users().iter().position(|u| u.id == user.id) {
            let len = self.screen.users().len();
            self.cursor.set(index, len);
        }
        Ok(())
    }

    /// Select the highlighted row. No-op outside `Loaded` or on an empty list.
    pub fn select_highlighted(&mut self) -> bool {
        if self.screen.users().is_empty() {
            return false;
        }
        self.select_row(self.cursor.highlighted()).is_ok()
    }

    pub fn move_up(&mut self) {
        let len = self.screen.users().len();
        self.cursor.up(len, 1);
    }

    pub fn move_down(&mut self) {
        let len = self.screen.users().len();
        self.cursor.down(len, 1);
    }

    pub fn page_up(&mut self) {
        let len = self.screen.users().len();
        self.cursor.up(len, self.cursor.page());
    }

    pub fn page_down(&mut self) {
        let len = self.screen.users().len();
        self.cursor.down(len, self.cursor.page());
    }

    pub fn home(&mut self) {
        let len = self.screen.users().len();
        self.cursor.home(len);
    }

    pub fn end(&mut self) {
        let len = self.screen.users().len();
        self.cursor.end(len);
    }

    /// Called by the renderer with the number of rows that fit.
    pub fn set_visible_rows(&mut self, visible: usize) {
        let len = self.screen.users().len();
        self.cursor.ensure_visible(visible, len);
    }

    // ------------------------------------------------------------------
    // Read access for rendering
    // ------------------------------------------------------------------

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.screen.phase()
    }

    #[must_use]
    pub fn screen(&self) -> &UserListScreen {
        &self.screen
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        self.screen.users()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&User> {
        self.screen.selected()
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.screen.error_message()
    }

    #[must_use]
    pub fn cursor(&self) -> ListCursor {
        self.cursor
    }

    /// All rows, in list order.
    #[must_use]
    pub fn rows(&self) -> Vec<RowView> {
        self.rows_in(0, usize::MAX)
    }

    /// Rows from `start`, at most `limit` of them.
    #[must_use]
    pub fn rows_in(&self, start: usize, limit: usize) -> Vec<RowView> {
        let highlighted = self.cursor.highlighted();
        let selected = self.screen.selected().map(|u| u.id);
        self.screen
            .users()
            .iter()
            .enumerate()
            .skip(start)
            .take(limit)
            .map(|(index, user)| {
                RowView::from_user(user, index == highlighted, selected == Some(user.id))
            })
            .collect()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase() == Phase::Loading
    }

    /// Where users are fetched from, e.g. `GET https://...`.
    #[must_use]
    pub fn source_label(&self) -> String {
        self.source.describe()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.ui_options
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Abort any outstanding fetch.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests;
