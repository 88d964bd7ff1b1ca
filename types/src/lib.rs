//! Core domain types for Roster.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod sanitize;
pub use sanitize::sanitize_display_line;

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// User records
// ============================================================================

/// Stable identifier of a user record; the list key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Key used by the list renderer.
    #[must_use]
    pub fn key(self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Employer of a user. Only the name is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
}

/// A user record as served by the directory endpoint.
///
/// Unknown fields in the payload (address, phone, website, ...) are ignored.
/// Records are immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub company: Company,
}

impl User {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        email: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::new(id),
            name: name.into(),
            email: email.into(),
            company: Company {
                name: company.into(),
            },
        }
    }

    #[must_use]
    pub fn company_name(&self) -> &str {
        &self.company.name
    }
}

// ============================================================================
// UI options
// ============================================================================

/// Rendering preferences resolved from config and CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiOptions {
    /// Use ASCII-only glyphs for markers and spinners.
    pub ascii_only: bool,
    /// Use the high-contrast palette.
    pub high_contrast: bool,
    /// Freeze the loading spinner.
    pub reduced_motion: bool,
}
