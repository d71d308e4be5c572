//! Runtime settings derived once from the CLI/environment.
//!
//! [`Settings`] is immutable after startup and shared through an `Arc`; it is
//! the only state visible to more than one request.

use crate::browser::provider::Strategy;
use crate::browser::SettleOptions;
use crate::cli::Cli;
use crate::utils::{token_info, token_preview};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Remote connection attempts before falling back to a local browser.
pub const REMOTE_ATTEMPTS: u32 = 3;
/// Backoff unit between remote attempts.
pub const BACKOFF_STEP: Duration = Duration::from_millis(1000);

/// Hint returned with every failure body.
pub const FAILURE_HINT: &str = "Si estás en Render, configura la variable BROWSERLESS_TOKEN. \
Obtén tu token gratis en https://www.browserless.io/";

#[derive(Clone)]
pub struct Settings {
    browserless_token: Option<String>,
    pub browserless_endpoint: Url,
    pub production: bool,
    pub base_url: String,
    pub chrome_executable: Option<PathBuf>,
    pub settle: SettleOptions,
    pub remote_attempts: u32,
    pub backoff_step: Duration,
}

impl Settings {
    /// Build settings from parsed CLI arguments.
    ///
    /// An empty token counts as no token.
    ///
    /// # Errors
    ///
    /// Returns an error when the Browserless endpoint or base URL is not a
    /// valid absolute URL.
    pub fn from_cli(cli: &Cli) -> Result<Self, url::ParseError> {
        let browserless_endpoint = Url::parse(&cli.browserless_endpoint)?;
        Url::parse(&cli.base_url)?;

        Ok(Self {
            browserless_token: cli
                .browserless_token
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from),
            browserless_endpoint,
            production: cli.app_env.eq_ignore_ascii_case("production"),
            base_url: cli.base_url.trim_end_matches('/').to_string(),
            chrome_executable: cli.chrome_executable.clone(),
            settle: SettleOptions::default(),
            remote_attempts: REMOTE_ATTEMPTS,
            backoff_step: BACKOFF_STEP,
        })
    }

    pub fn has_token(&self) -> bool {
        self.browserless_token.is_some()
    }

    /// Redacted credential, safe for logs.
    pub fn token_preview(&self) -> Option<String> {
        self.browserless_token.as_deref().map(token_preview)
    }

    /// Credential description for failure bodies.
    pub fn token_info(&self) -> String {
        token_info(self.browserless_token.as_deref())
    }

    /// The acquisition plan: remote first when a token is set, then local.
    pub fn strategies(&self) -> Vec<Strategy> {
        let mut strategies = Vec::with_capacity(2);
        if let Some(token) = &self.browserless_token {
            let mut endpoint = self.browserless_endpoint.clone();
            endpoint.query_pairs_mut().append_pair("token", token);
            strategies.push(Strategy::Remote {
                endpoint,
                attempts: self.remote_attempts,
                backoff_step: self.backoff_step,
            });
        }
        strategies.push(Strategy::Local);
        strategies
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("browserless_token", &self.token_preview())
            .field("browserless_endpoint", &self.browserless_endpoint.as_str())
            .field("production", &self.production)
            .field("base_url", &self.base_url)
            .field("chrome_executable", &self.chrome_executable)
            .field("settle", &self.settle)
            .field("remote_attempts", &self.remote_attempts)
            .field("backoff_step", &self.backoff_step)
            .finish()
    }
}
