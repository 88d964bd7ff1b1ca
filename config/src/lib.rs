//! Configuration loading for Roster.
//!
//! The config file lives at `~/.roster/config.toml`. Every section is optional;
//! a missing file is not an error and yields the defaults.
//!
//! ```toml
//! [app]
//! ascii_only = false
//! high_contrast = false
//! reduced_motion = false
//! mouse = true
//!
//! [source]
//! url = "https://jsonplaceholder.typicode.com/users"
//! timeout_secs = 30
//! connect_timeout_secs = 10
//! ```
//!
//! String values may reference environment variables as `${NAME}`.
//! `ROSTER_USERS_URL` overrides `[source] url` when set.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

use roster_types::UiOptions;

/// Endpoint served when nothing overrides it.
pub const DEFAULT_USERS_URL: &str = "https://jsonplaceholder.typicode.com/users";

/// Environment variable overriding the endpoint.
pub const USERS_URL_ENV: &str = "ROSTER_USERS_URL";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct RosterConfig {
    pub app: Option<AppConfig>,
    pub source: Option<SourceConfig>,
    /// Set from the command line; wins over every other source.
    #[serde(skip)]
    url_override: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for markers and spinners.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
    /// Freeze the loading spinner.
    #[serde(default)]
    pub reduced_motion: bool,
    /// Capture the mouse so rows can be clicked. Disabling it restores native
    /// terminal text selection.
    #[serde(default = "default_true")]
    pub mouse: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ascii_only: false,
            high_contrast: false,
            reduced_motion: false,
            mouse: true,
        }
    }
}

/// Where the user list comes from.
#[derive(Debug, Default, Deserialize)]
pub struct SourceConfig {
    pub url: Option<String>,
    /// Whole-request timeout. Default: 30.
    pub timeout_secs: Option<u64>,
    /// TCP/TLS connect timeout. Default: 10.
    pub connect_timeout_secs: Option<u64>,
}

/// Replace `${NAME}` references with the variable's value.
///
/// Unset variables expand to the empty string; an unterminated `${` is kept
/// verbatim.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        if !name.is_empty() {
            out.push_str(&env::var(name).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

impl RosterConfig {
    /// Load from the default location.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load from an explicit path. A missing file yields `Ok(None)`.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|source| {
            tracing::warn!(path = %path.display(), %source, "Failed to read config");
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        Self::parse(&content).map(Some).map_err(|source| {
            tracing::warn!(path = %path.display(), %source, "Failed to parse config");
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        let app = self.app.as_ref();
        UiOptions {
            ascii_only: app.is_some_and(|a| a.ascii_only),
            high_contrast: app.is_some_and(|a| a.high_contrast),
            reduced_motion: app.is_some_and(|a| a.reduced_motion),
        }
    }

    #[must_use]
    pub fn mouse_enabled(&self) -> bool {
        self.app.as_ref().is_none_or(|a| a.mouse)
    }

    pub fn override_url(&mut self, url: impl Into<String>) {
        self.url_override = Some(url.into());
    }

    /// Force ASCII glyphs, high contrast or no mouse on top of the file settings.
    pub fn override_app(&mut self, ascii_only: bool, high_contrast: bool, no_mouse: bool) {
        let app = self.app.get_or_insert_with(AppConfig::default);
        app.ascii_only |= ascii_only;
        app.high_contrast |= high_contrast;
        if no_mouse {
            app.mouse = false;
        }
    }

    /// Resolved endpoint: command line, `ROSTER_USERS_URL`, `[source] url`,
    /// then the default.
    #[must_use]
    pub fn users_url(&self) -> String {
        if let Some(url) = self.url_override.as_deref()
            && !url.trim().is_empty()
        {
            return url.trim().to_string();
        }

        if let Ok(url) = env::var(USERS_URL_ENV)
            && !url.trim().is_empty()
        {
            return url.trim().to_string();
        }

        self.source
            .as_ref()
            .and_then(|s| s.url.as_deref())
            .map(expand_env_vars)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_USERS_URL.to_string())
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        let secs = self
            .source
            .as_ref()
            .and_then(|s| s.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        let secs = self
            .source
            .as_ref()
            .and_then(|s| s.connect_timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".roster").join("config.toml"))
}
