//! Page fetching on top of an acquired session.

use super::{BrowserBackend, Session, SettleOptions};
use crate::error::LecturasError;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Render `url` in the session's browser and return the document markup.
///
/// The page (not the session) is closed before returning.
///
/// # Errors
///
/// [`LecturasError::Navigation`] carrying `url` when navigation fails or the
/// network does not settle within `settle.timeout`.
#[instrument(level = "info", skip_all, fields(%url))]
pub async fn fetch_page<B: BrowserBackend>(
    backend: &B,
    session: &Session<B::Browser>,
    url: &str,
    settle: &SettleOptions,
) -> Result<String, LecturasError> {
    let t0 = Instant::now();
    match backend.fetch_html(&session.browser, url, settle).await {
        Ok(html) => {
            info!(
                bytes = html.len(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Fetched rendered page"
            );
            Ok(html)
        }
        Err(e) => {
            warn!(elapsed_ms = t0.elapsed().as_millis() as u64, error = %e, "Navigation failed");
            Err(LecturasError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })
        }
    }
}
