//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

use roster_engine::RosterConfig;

/// Browse the user directory in your terminal.
#[derive(Parser, Debug, Default)]
#[command(name = "roster", version)]
pub struct Args {
    /// Endpoint returning the JSON user array. Overrides `ROSTER_USERS_URL`
    /// and `[source] url`.
    #[arg(long, value_name = "URL")]
    pub url: Option<String>,

    /// Config file to read instead of `~/.roster/config.toml`.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use ASCII-only glyphs.
    #[arg(long)]
    pub ascii: bool,

    /// Use the high-contrast palette.
    #[arg(long)]
    pub high_contrast: bool,

    /// Leave the mouse to the terminal (no click to select).
    #[arg(long)]
    pub no_mouse: bool,
}

impl Args {
    /// Load the config file and layer the flags on top. A config that cannot
    /// be read or parsed is logged and replaced by defaults.
    pub fn resolve_config(&self) -> RosterConfig {
        let loaded = match &self.config {
            Some(path) => RosterConfig::load_from(path),
            None => RosterConfig::load(),
        };
        let mut config = match loaded {
            Ok(Some(config)) => config,
            Ok(None) => RosterConfig::default(),
            Err(err) => {
                tracing::warn!(path = %err.path().display(), "Using default config: {err}");
                RosterConfig::default()
            }
        };

        if let Some(url) = &self.url {
            config.override_url(url.clone());
        }
        config.override_app(self.ascii, self.high_contrast, self.no_mouse);
        config
    }
}
