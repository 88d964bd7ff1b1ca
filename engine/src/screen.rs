//! The user-list screen state machine.
//!
//! ```text
//!            start()                 complete(ok)
//!   (new) ──────────► Loading ───────────────────► Loaded
//!                        │ ▲
//!        complete(err)   │ │ retry()
//!                        ▼ │
//!                       Failed
//! ```
//!
//! Every `start()`/`retry()` mints a fresh [`FetchTicket`]. A completion is
//! applied only if it carries the current ticket and the screen is still
//! `Loading`; anything else is stale and dropped, so an older request that
//! resolves late can never overwrite a newer one.

use thiserror::Error;
use tokio::sync::watch;

use roster_providers::FETCH_FAILED;
use roster_types::{User, UserId};

/// Discriminant of [`ScreenState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Loaded,
    Failed,
}

/// Identifies one fetch attempt. Only the most recently issued ticket is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    #[must_use]
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedState {
    users: Vec<User>,
    selected: Option<User>,
}

impl LoadedState {
    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    #[must_use]
    pub fn selected(&self) -> Option<&User> {
        self.selected.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenState {
    Loading,
    Loaded(LoadedState),
    Failed { message: String },
}

impl ScreenState {
    #[must_use]
    pub fn phase(&self) -> Phase {
        match self {
            ScreenState::Loading => Phase::Loading,
            ScreenState::Loaded(_) => Phase::Loaded,
            ScreenState::Failed { .. } => Phase::Failed,
        }
    }
}

/// Result of offering a completion to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Applied; the list now holds this many users.
    Loaded(usize),
    /// Applied; the screen shows the error view.
    Failed,
    /// Superseded ticket or attempt already settled; nothing changed.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("no list is loaded")]
    NotLoaded,
    #[error("user {0} is not in the current list")]
    NotListed(UserId),
    #[error("row {index} is out of range for {len} rows")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Debug)]
pub struct UserListScreen {
    state: ScreenState,
    generation: u64,
    phase_tx: watch::Sender<Phase>,
}

impl Default for UserListScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl UserListScreen {
    /// A freshly mounted screen: `Loading`, no ticket issued yet.
    #[must_use]
    pub fn new() -> Self {
        let (phase_tx, _) = watch::channel(Phase::Loading);
        Self {
            state: ScreenState::Loading,
            generation: 0,
            phase_tx,
        }
    }

    /// Enter `Loading` and issue the ticket for exactly one fetch.
    pub fn start(&mut self) -> FetchTicket {
        self.generation += 1;
        self.set_state(ScreenState::Loading);
        tracing::debug!(ticket = self.generation, "Fetch attempt started");
        FetchTicket(self.generation)
    }

    /// Restart from `Failed`. Returns `None` in any other phase.
    pub fn retry(&mut self) -> Option<FetchTicket> {
        if self.phase() != Phase::Failed {
            return None;
        }
        Some(self.start())
    }

    /// Apply the outcome of the fetch identified by `ticket`.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<Vec<User>, String>,
    ) -> Completion {
        if !self.is_live(ticket) {
            tracing::debug!(
                ticket = ticket.0,
                current = self.generation,
                phase = ?self.phase(),
                "Discarding stale fetch completion"
            );
            return Completion::Stale;
        }

        match outcome {
            Ok(users) => {
                let count = users.len();
                self.set_state(ScreenState::Loaded(LoadedState {
                    users,
                    selected: None,
                }));
                Completion::Loaded(count)
            }
            Err(reason) => {
                let message = if reason.trim().is_empty() {
                    FETCH_FAILED.to_string()
                } else {
                    reason
                };
                self.set_state(ScreenState::Failed { message });
                Completion::Failed
            }
        }
    }

    pub fn on_fetch_success(&mut self, ticket: FetchTicket, users: Vec<User>) -> Completion {
        self.complete(ticket, Ok(users))
    }

    pub fn on_fetch_failure(
        &mut self,
        ticket: FetchTicket,
        reason: impl Into<String>,
    ) -> Completion {
        self.complete(ticket, Err(reason.into()))
    }

    /// Record `user` as the selection. It must be in the live list (matched by id);
    /// the stored value is the listed record.
    pub fn select(&mut self, user: &User) -> Result<(), SelectError> {
        let ScreenState::Loaded(loaded) = &mut self.state else {
            return Err(SelectError::NotLoaded);
        };
        let listed = loaded
            .users
            .iter()
            .find(|u| u.id == user.id)
            .ok_or(SelectError::NotListed(user.id))?;
        loaded.selected = Some(listed.clone());
        Ok(())
    }

    /// Row-index form of [`select`](Self::select).
    pub fn select_index(&mut self, index: usize) -> Result<&User, SelectError> {
        let ScreenState::Loaded(loaded) = &mut self.state else {
            return Err(SelectError::NotLoaded);
        };
        let len = loaded.users.len();
        let user = loaded
            .users
            .get(index)
            .ok_or(SelectError::OutOfRange { index, len })?;
        Ok(loaded.selected.insert(user.clone()))
    }

    #[must_use]
    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Users of the loaded list; empty in any other phase.
    #[must_use]
    pub fn users(&self) -> &[User] {
        match &self.state {
            ScreenState::Loaded(loaded) => loaded.users(),
            _ => &[],
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<&User> {
        match &self.state {
            ScreenState::Loaded(loaded) => loaded.selected(),
            _ => None,
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            ScreenState::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// The ticket a completion must carry to be applied, if one is outstanding.
    #[must_use]
    pub fn current_ticket(&self) -> Option<FetchTicket> {
        (self.generation > 0 && self.phase() == Phase::Loading)
            .then_some(FetchTicket(self.generation))
    }

    /// Observe phase transitions. The receiver starts at the current phase.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.phase_tx.subscribe()
    }

    fn is_live(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.generation && self.phase() == Phase::Loading
    }

    fn set_state(&mut self, state: ScreenState) {
        let phase = state.phase();
        self.state = state;
        self.phase_tx.send_replace(phase);
    }
}
