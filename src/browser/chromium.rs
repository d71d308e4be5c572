//! Chromium backend driven over the DevTools protocol with chromiumoxide.
//!
//! Both remote (Browserless) and local browsers are plain CDP connections;
//! they only differ in how the websocket is obtained. chromiumoxide needs its
//! [`Handler`] polled for the connection to make progress, so every browser
//! owns a spawned task that drives it until the browser is dropped.
//!
//! Local launches each get a throwaway profile directory so concurrent
//! requests never contend for the same Chrome profile lock.

use super::idle::{wait_for_idle, NetworkSignal};
use super::{BrowserBackend, SettleOptions};
use crate::error::BrowserError;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::{Browser, BrowserConfig, Handler, Page};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// A connected or launched Chromium.
pub struct ChromeBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
    /// Profile of a locally launched browser, removed on drop.
    profile: Option<TempDir>,
}

impl ChromeBrowser {
    fn new(browser: Browser, handler: Handler, profile: Option<TempDir>) -> Self {
        Self {
            browser,
            handler: spawn_handler(handler),
            profile,
        }
    }
}

impl Drop for ChromeBrowser {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// [`BrowserBackend`] backed by chromiumoxide.
#[derive(Debug, Clone, Default)]
pub struct ChromiumBackend {
    /// Explicit Chrome/Chromium binary; auto-detected when `None`.
    executable: Option<PathBuf>,
}

impl ChromiumBackend {
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self { executable }
    }

    fn launch_config(&self, profile: &TempDir) -> Result<BrowserConfig, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .user_data_dir(profile.path());
        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(BrowserError::Launch)
    }
}

#[async_trait]
impl BrowserBackend for ChromiumBackend {
    type Browser = ChromeBrowser;

    #[instrument(level = "debug", skip_all, fields(host = endpoint.host_str().unwrap_or_default()))]
    async fn connect(&self, endpoint: &Url) -> Result<ChromeBrowser, BrowserError> {
        let (browser, handler) = Browser::connect(endpoint.as_str())
            .await
            .map_err(|e| BrowserError::Connect(e.to_string()))?;
        info!("Connected to remote browser");
        Ok(ChromeBrowser::new(browser, handler, None))
    }

    #[instrument(level = "debug", skip_all)]
    async fn launch(&self) -> Result<ChromeBrowser, BrowserError> {
        let profile = profile_dir()?;
        let config = self.launch_config(&profile)?;
        let (browser, handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;
        info!(executable = ?self.executable, profile = %profile.path().display(), "Launched local browser");
        Ok(ChromeBrowser::new(browser, handler, Some(profile)))
    }

    async fn terminate(&self, mut browser: ChromeBrowser) -> Result<(), BrowserError> {
        browser.browser.close().await?;
        browser
            .browser
            .wait()
            .await
            .map_err(|e| BrowserError::Page(e.to_string()))?;
        if let Some(profile) = browser.profile.take() {
            if let Err(e) = profile.close() {
                warn!(error = %e, "Failed to remove browser profile");
            }
        }
        Ok(())
    }

    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch_html(
        &self,
        browser: &ChromeBrowser,
        url: &str,
        settle: &SettleOptions,
    ) -> Result<String, BrowserError> {
        let t0 = Instant::now();
        let deadline = t0 + settle.timeout;

        let page = within(deadline, settle.timeout, async {
            browser
                .browser
                .new_page("about:blank")
                .await
                .map_err(BrowserError::from)
        })
        .await?;
        let result = within(deadline, settle.timeout, render(&page, url, settle)).await;

        if let Err(e) = page.close().await {
            warn!(error = %e, "Failed to close page");
        }
        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, ok = result.is_ok(), "Page closed");
        result
    }
}

/// Navigate and wait for the network to go quiet, then read the DOM.
async fn render(page: &Page, url: &str, settle: &SettleOptions) -> Result<String, BrowserError> {
    // Listeners go in before navigating so no request is missed.
    let started = page
        .event_listener::<EventRequestWillBeSent>()
        .await?
        .map(|ev| NetworkSignal::Started(ev.request_id.inner().clone()));
    let finished = page
        .event_listener::<EventLoadingFinished>()
        .await?
        .map(|ev| NetworkSignal::Settled(ev.request_id.inner().clone()));
    let failed = page
        .event_listener::<EventLoadingFailed>()
        .await?
        .map(|ev| NetworkSignal::Settled(ev.request_id.inner().clone()));
    let signals = stream::select(started, stream::select(finished, failed));

    page.goto(url).await?;
    wait_for_idle(signals, settle.max_inflight, settle.quiet_window).await?;

    let html = page.content().await?;
    debug!(bytes = html.len(), "Captured rendered document");
    Ok(html)
}

/// Fresh, uniquely named profile directory for one local browser.
fn profile_dir() -> Result<TempDir, BrowserError> {
    tempfile::Builder::new()
        .prefix("lecturas-chrome-")
        .tempdir()
        .map_err(|e| BrowserError::Launch(format!("cannot create profile directory: {e}")))
}

/// Run `fut` unless `deadline` passes first. Successive calls sharing a
/// deadline share one budget.
async fn within<T>(
    deadline: Instant,
    budget: Duration,
    fut: impl Future<Output = Result<T, BrowserError>>,
) -> Result<T, BrowserError> {
    timeout_at(deadline, fut)
        .await
        .unwrap_or(Err(BrowserError::Timeout(budget)))
}

fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!(error = %e, "CDP handler stopped");
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[test]
    fn test_profile_dirs_are_unique_and_removed() {
        let first = profile_dir().unwrap();
        let second = profile_dir().unwrap();
        assert_ne!(first.path(), second.path());
        assert!(first.path().is_dir());

        let path = first.path().to_path_buf();
        drop(first);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_page_steps_share_one_budget() {
        let budget = Duration::from_millis(60);
        let deadline = Instant::now() + budget;

        // a slow page open eats into the time left for rendering
        within(deadline, budget, async {
            sleep(Duration::from_millis(40)).await;
            Ok::<_, BrowserError>(())
        })
        .await
        .unwrap();

        let res = within(deadline, budget, async {
            sleep(Duration::from_millis(40)).await;
            Ok::<_, BrowserError>(())
        })
        .await;
        assert!(matches!(res, Err(BrowserError::Timeout(d)) if d == budget));
    }

    #[tokio::test]
    async fn test_stalled_page_open_times_out() {
        let budget = Duration::from_millis(20);
        let res = within(
            Instant::now() + budget,
            budget,
            std::future::pending::<Result<(), BrowserError>>(),
        )
        .await;
        assert!(matches!(res, Err(BrowserError::Timeout(_))));
    }
}
