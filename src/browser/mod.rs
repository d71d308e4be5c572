//! Browser sessions: acquisition, page fetching and teardown.
//!
//! The content of the readings page is rendered client-side, so every request
//! needs a real browser. This module hides the browser engine behind
//! [`BrowserBackend`] and layers the acquisition policy on top of it.
//!
//! # Submodules
//!
//! - [`provider`]: ordered acquisition strategies (remote with retries, then local)
//! - [`fetcher`]: navigation with the network-idle wait, mapped to pipeline errors
//! - [`idle`]: the "network substantially idle" detector
//! - [`chromium`]: the chromiumoxide-backed implementation
//!
//! # Ownership
//!
//! A [`Session`] records whether this process owns the browser. Remote
//! sessions belong to the automation backend and are never closed from here;
//! local ones are terminated on release.

use crate::error::BrowserError;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

pub mod chromium;
pub mod fetcher;
pub mod idle;
pub mod provider;

#[cfg(test)]
pub mod mock;

/// Who is responsible for closing a browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Provided by a remote backend that manages its own lifecycle.
    ExternallyManaged,
    /// Spawned by this process; must be terminated on release.
    LocallyOwned,
}

/// A browser handed out by the [`provider::SessionProvider`].
#[derive(Debug)]
pub struct Session<B> {
    pub browser: B,
    pub ownership: Ownership,
}

impl<B> Session<B> {
    pub fn remote(browser: B) -> Self {
        Self {
            browser,
            ownership: Ownership::ExternallyManaged,
        }
    }

    pub fn local(browser: B) -> Self {
        Self {
            browser,
            ownership: Ownership::LocallyOwned,
        }
    }
}

/// When a navigation counts as finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleOptions {
    /// Hard budget for navigation plus the idle wait.
    pub timeout: Duration,
    /// Requests allowed in flight while still considered idle.
    pub max_inflight: usize,
    /// How long the request count must stay at or below `max_inflight`.
    pub quiet_window: Duration,
}

impl Default for SettleOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_inflight: 2,
            quiet_window: Duration::from_millis(500),
        }
    }
}

/// A browser engine able to provide sessions and render pages.
///
/// Implementors must honor [`SettleOptions::timeout`] in
/// [`fetch_html`](BrowserBackend::fetch_html) and close the page they opened
/// whatever the result.
#[async_trait]
pub trait BrowserBackend: Send + Sync {
    /// Handle to a running browser.
    type Browser: Send + Sync;

    /// Connect to a remote automation endpoint.
    async fn connect(&self, endpoint: &Url) -> Result<Self::Browser, BrowserError>;

    /// Launch a local headless browser process.
    async fn launch(&self) -> Result<Self::Browser, BrowserError>;

    /// Shut a locally launched browser down.
    async fn terminate(&self, browser: Self::Browser) -> Result<(), BrowserError>;

    /// Open a page, navigate to `url`, wait for the network to settle and
    /// return the rendered document.
    async fn fetch_html(
        &self,
        browser: &Self::Browser,
        url: &str,
        settle: &SettleOptions,
    ) -> Result<String, BrowserError>;
}
