//! Date → readings orchestration.
//!
//! One invocation walks `date → url → session → html → readings` and always
//! ends in exactly one [`Outcome`]. Errors are mapped at this boundary; nothing
//! propagates past it.
//!
//! Once a session has been acquired it is released exactly once, whether the
//! navigation succeeded or not.

use crate::browser::fetcher::fetch_page;
use crate::browser::provider::SessionProvider;
use crate::browser::BrowserBackend;
use crate::config::{Settings, FAILURE_HINT};
use crate::error::Result;
use crate::models::{Lecturas, Outcome};
use crate::scrapers::vaticannews;
use crate::utils::{parse_fecha, resolve_url};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument};

/// Anything able to answer a readings request. The HTTP layer only sees this.
#[async_trait]
pub trait ReadingsService: Send + Sync {
    async fn readings(&self, fecha: &str) -> Outcome;
}

/// The acquisition-and-extraction pipeline over a browser backend.
pub struct Pipeline<B> {
    provider: SessionProvider<B>,
    settings: Arc<Settings>,
}

impl<B: BrowserBackend> Pipeline<B> {
    pub fn new(backend: B, settings: Arc<Settings>) -> Self {
        let provider =
            SessionProvider::new(backend, settings.strategies(), settings.token_preview());
        Self { provider, settings }
    }

    #[cfg(test)]
    pub fn provider(&self) -> &SessionProvider<B> {
        &self.provider
    }

    /// Run the pipeline for a `YYYY-MM-DD` date string.
    #[instrument(level = "info", skip(self))]
    pub async fn run(&self, fecha: &str) -> Outcome {
        let t0 = Instant::now();
        match self.try_run(fecha).await {
            Ok((url, lecturas)) => {
                info!(
                    %url,
                    empty = lecturas.is_empty(),
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "Readings extracted"
                );
                Outcome::success(fecha, url, lecturas)
            }
            Err(e) => {
                error!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %e, "Readings request failed");
                Outcome::failure(fecha, &e, self.settings.token_info(), FAILURE_HINT)
            }
        }
    }

    async fn try_run(&self, fecha: &str) -> Result<(String, Lecturas)> {
        let date = parse_fecha(fecha)?;
        let url = resolve_url(&self.settings.base_url, date);

        let session = self.provider.acquire().await?;
        let fetched = fetch_page(self.provider.backend(), &session, &url, &self.settings.settle).await;
        self.provider.release(session).await;

        let html = fetched?;
        Ok((url, vaticannews::extract(&html)))
    }
}

#[async_trait]
impl<B: BrowserBackend> ReadingsService for Pipeline<B> {
    async fn readings(&self, fecha: &str) -> Outcome {
        self.run(fecha).await
    }
}
