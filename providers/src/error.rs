//! Fetch failure taxonomy.

use reqwest::StatusCode;
use thiserror::Error;

use crate::payload::PayloadError;

/// Headline shown on the error view for every failure kind.
pub const FETCH_FAILED: &str = "Failed to load data";

#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS, timeout, or body read failure.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("server returned {status}")]
    Status { status: StatusCode, body: String },
    #[error("response body exceeded {limit} bytes")]
    TooLarge { limit: usize },
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

impl FetchError {
    /// Single-line reason for the error view. Never empty.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Transport(e) if e.is_timeout() => {
                format!("{FETCH_FAILED} (request timed out)")
            }
            FetchError::Transport(e) if e.is_connect() => {
                format!("{FETCH_FAILED} (could not connect)")
            }
            FetchError::Transport(e) => format!("{FETCH_FAILED} ({e})"),
            FetchError::Status { status, .. } => format!("{FETCH_FAILED} (HTTP {status})"),
            FetchError::TooLarge { .. } => format!("{FETCH_FAILED} (response too large)"),
            FetchError::Payload(e) => format!("{FETCH_FAILED} (malformed payload: {e})"),
        }
    }

    /// HTTP status for `Status` failures.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
