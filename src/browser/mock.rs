//! Scripted [`BrowserBackend`] for tests.

use super::{BrowserBackend, SettleOptions};
use crate::error::BrowserError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockBrowser {
    pub origin: &'static str,
}

/// Backend whose outcomes are fixed up front and whose calls are counted.
#[derive(Debug)]
pub struct MockBackend {
    /// Connect succeeds on this attempt number; `None` means never.
    remote_ok_on: Option<usize>,
    launch_ok: bool,
    terminate_ok: bool,
    page: Result<String, BrowserError>,
    pub connects: AtomicUsize,
    pub launches: AtomicUsize,
    pub terminates: AtomicUsize,
    pub fetches: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            remote_ok_on: Some(1),
            launch_ok: true,
            terminate_ok: true,
            page: Ok(String::from("<html><body></body></html>")),
            connects: AtomicUsize::new(0),
            launches: AtomicUsize::new(0),
            terminates: AtomicUsize::new(0),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn remote_fails(mut self) -> Self {
        self.remote_ok_on = None;
        self
    }

    pub fn remote_succeeds_on(mut self, attempt: usize) -> Self {
        self.remote_ok_on = Some(attempt);
        self
    }

    pub fn launch_fails(mut self) -> Self {
        self.launch_ok = false;
        self
    }

    pub fn terminate_fails(mut self) -> Self {
        self.terminate_ok = false;
        self
    }

    pub fn page_html(mut self, html: impl Into<String>) -> Self {
        self.page = Ok(html.into());
        self
    }

    pub fn page_times_out(mut self) -> Self {
        self.page = Err(BrowserError::Timeout(SettleOptions::default().timeout));
        self
    }

    pub fn browser(&self, origin: &'static str) -> MockBrowser {
        MockBrowser { origin }
    }
}

#[async_trait]
impl BrowserBackend for MockBackend {
    type Browser = MockBrowser;

    async fn connect(&self, _endpoint: &Url) -> Result<MockBrowser, BrowserError> {
        let attempt = self.connects.fetch_add(1, Ordering::SeqCst) + 1;
        match self.remote_ok_on {
            Some(n) if attempt >= n => Ok(self.browser("remote")),
            _ => Err(BrowserError::Connect("browserless unreachable".to_string())),
        }
    }

    async fn launch(&self) -> Result<MockBrowser, BrowserError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.launch_ok {
            Ok(self.browser("local"))
        } else {
            Err(BrowserError::Launch("chrome not found".to_string()))
        }
    }

    async fn terminate(&self, _browser: MockBrowser) -> Result<(), BrowserError> {
        self.terminates.fetch_add(1, Ordering::SeqCst);
        if self.terminate_ok {
            Ok(())
        } else {
            Err(BrowserError::Page("browser already gone".to_string()))
        }
    }

    async fn fetch_html(
        &self,
        _browser: &MockBrowser,
        _url: &str,
        _settle: &SettleOptions,
    ) -> Result<String, BrowserError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.page.clone()
    }
}
