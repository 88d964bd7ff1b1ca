//! User directory clients.
//!
//! # Architecture
//!
//! - [`UserSource`] - the seam the engine fetches through; one call, one outcome
//! - [`HttpUserSource`] - `GET <url>` over a shared `reqwest` client
//! - [`payload`] - body validation into [`User`] values
//! - [`FetchError`] - every failure the screen can show
//!
//! A fetch is a binary outcome: either the whole validated list, or an error.
//! Nothing is retried here; retry is a user action handled by the engine.

mod error;
pub mod payload;

use std::{future::Future, pin::Pin, time::Duration};

use futures_util::StreamExt;
use reqwest::Response;

pub use error::{FETCH_FAILED, FetchError};
pub use payload::{PayloadError, parse_users};
pub use roster_types::{User, UserId};

/// Largest success body accepted.
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;
const MAX_REDIRECTS: usize = 5;
const TCP_KEEPALIVE_SECS: u64 = 60;

/// Future returned by [`UserSource::fetch_users`].
pub type FetchFut = Pin<Box<dyn Future<Output = Result<Vec<User>, FetchError>> + Send + 'static>>;

/// Something that can produce the user list.
///
/// The returned future owns everything it needs so the caller can spawn it.
pub trait UserSource: Send + Sync {
    fn fetch_users(&self) -> FetchFut;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Client timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

pub fn http_client(settings: HttpSettings) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.timeout)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .build()
}

/// Fetches the list with a plain `GET`: no auth, no query, no extra headers.
#[derive(Debug, Clone)]
pub struct HttpUserSource {
    client: reqwest::Client,
    url: String,
}

impl HttpUserSource {
    pub fn new(url: impl Into<String>, settings: HttpSettings) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(http_client(settings)?, url))
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn fetch(&self) -> Result<Vec<User>, FetchError> {
        tracing::debug!(url = %self.url, "Fetching users");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = read_capped_error_body(response).await;
            tracing::warn!(
                url = %self.url,
                %status,
                body_bytes = body.len(),
                "User fetch rejected"
            );
            return Err(FetchError::Status { status, body });
        }

        let body = read_body_capped(response, MAX_BODY_BYTES).await?;
        let users = parse_users(&body)?;
        tracing::debug!(url = %self.url, users = users.len(), "Fetched users");
        Ok(users)
    }
}

impl UserSource for HttpUserSource {
    fn fetch_users(&self) -> FetchFut {
        let source = self.clone();
        Box::pin(async move { source.fetch().await })
    }

    fn describe(&self) -> String {
        format!("GET {}", self.url)
    }
}

/// Read a success body, failing once it grows past `limit`.
pub async fn read_body_capped(response: Response, limit: usize) -> Result<Vec<u8>, FetchError> {
    if let Some(len) = response.content_length()
        && len > limit as u64
    {
        return Err(FetchError::TooLarge { limit });
    }

    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Transport)?;
        if body.len() + chunk.len() > limit {
            return Err(FetchError::TooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Best-effort read of an error body for logging; truncated, never fails.
pub async fn read_capped_error_body(response: Response) -> String {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
