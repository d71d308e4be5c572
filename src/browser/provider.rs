//! Browser acquisition with remote retries and local fallback.
//!
//! Acquisition is an ordered list of [`Strategy`] values. Each one is tried in
//! turn; the first success wins and every failure is kept so the final error
//! can explain all of them.
//!
//! # Retry Strategy
//!
//! Only the remote strategy retries:
//! - 3 attempts by default
//! - linear backoff of `attempt × 1s` between attempts (1s, 2s)
//! - no wait after the last attempt
//!
//! The local launch runs once.

use super::{BrowserBackend, Session};
use crate::error::{BrowserError, LecturasError};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// One way of obtaining a browser.
#[derive(Clone)]
pub enum Strategy {
    /// Connect to a remote automation backend.
    Remote {
        /// Full endpoint, credential included. Never logged.
        endpoint: Url,
        /// Total connection attempts, including the first.
        attempts: u32,
        /// Backoff unit; the wait after attempt `n` is `n × backoff_step`.
        backoff_step: Duration,
    },
    /// Launch a browser process on this machine.
    Local,
}

impl Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::Remote { .. } => "remote",
            Strategy::Local => "local",
        }
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Remote {
                endpoint,
                attempts,
                backoff_step,
            } => f
                .debug_struct("Remote")
                .field("host", &endpoint.host_str())
                .field("attempts", attempts)
                .field("backoff_step", backoff_step)
                .finish(),
            Strategy::Local => f.write_str("Local"),
        }
    }
}

/// Hands out browser sessions and takes them back.
pub struct SessionProvider<B> {
    backend: B,
    strategies: Vec<Strategy>,
    /// Redacted credential, appended to the composite failure message.
    token_preview: Option<String>,
}

impl<B: BrowserBackend> SessionProvider<B> {
    /// Create a provider that tries `strategies` in order.
    pub fn new(backend: B, strategies: Vec<Strategy>, token_preview: Option<String>) -> Self {
        Self {
            backend,
            strategies,
            token_preview,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Obtain a browser session.
    ///
    /// # Errors
    ///
    /// [`LecturasError::Session`] when every strategy failed. The message
    /// lists each strategy's failure and the credential preview.
    #[instrument(level = "info", skip_all)]
    pub async fn acquire(&self) -> Result<Session<B::Browser>, LecturasError> {
        let t0 = Instant::now();
        let mut failures: Vec<String> = Vec::new();

        for strategy in &self.strategies {
            match self.try_strategy(strategy).await {
                Ok(session) => {
                    info!(
                        strategy = strategy.name(),
                        fallback = !failures.is_empty(),
                        elapsed_ms = t0.elapsed().as_millis() as u64,
                        "Browser session acquired"
                    );
                    return Ok(session);
                }
                Err(e) => {
                    warn!(strategy = strategy.name(), error = %e, "Acquisition strategy failed");
                    failures.push(e);
                }
            }
        }

        let mut message = if failures.is_empty() {
            "no acquisition strategy configured".to_string()
        } else {
            failures.join("; ")
        };
        if let Some(preview) = &self.token_preview {
            message.push_str(&format!("; token {preview}"));
        }
        error!(elapsed_ms = t0.elapsed().as_millis() as u64, %message, "Could not obtain a browser");
        Err(LecturasError::Session { message })
    }

    /// Give a session back.
    ///
    /// Remote sessions are left to their backend. Local ones are terminated;
    /// a failure to terminate is logged and otherwise ignored.
    #[instrument(level = "info", skip_all, fields(ownership = ?session.ownership))]
    pub async fn release(&self, session: Session<B::Browser>) {
        match session.ownership {
            super::Ownership::ExternallyManaged => {
                debug!("Leaving remote session to the backend");
            }
            super::Ownership::LocallyOwned => {
                if let Err(e) = self.backend.terminate(session.browser).await {
                    warn!(error = %e, "Failed to close local browser; ignoring");
                } else {
                    debug!("Local browser closed");
                }
            }
        }
    }

    async fn try_strategy(&self, strategy: &Strategy) -> Result<Session<B::Browser>, String> {
        match strategy {
            Strategy::Remote {
                endpoint,
                attempts,
                backoff_step,
            } => self
                .connect_with_retries(endpoint, *attempts, *backoff_step)
                .await
                .map(Session::remote)
                .map_err(|e| format!("{e} (after {} attempts)", (*attempts).max(1))),
            Strategy::Local => self
                .backend
                .launch()
                .await
                .map(Session::local)
                .map_err(|e| e.to_string()),
        }
    }

    async fn connect_with_retries(
        &self,
        endpoint: &Url,
        attempts: u32,
        backoff_step: Duration,
    ) -> Result<B::Browser, BrowserError> {
        let attempts = attempts.max(1);
        let preview = self.token_preview.as_deref().unwrap_or("-");
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            info!(
                attempt,
                max = attempts,
                host = endpoint.host_str().unwrap_or_default(),
                token = preview,
                "Connecting to remote browser"
            );

            match self.backend.connect(endpoint).await {
                Ok(browser) => return Ok(browser),
                Err(e) if attempt >= attempts => {
                    warn!(attempt, max = attempts, token = preview, error = %e, "Remote connect exhausted attempts");
                    return Err(e);
                }
                Err(e) => {
                    let delay = backoff_step * attempt;
                    warn!(attempt, max = attempts, token = preview, ?delay, error = %e, "Remote connect failed; backing off");
                    sleep(delay).await;
                }
            }
        }
    }
}
