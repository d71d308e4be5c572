//! "Network substantially idle" detection.
//!
//! A page counts as settled once no more than `max_inflight` requests have
//! been pending for a continuous `quiet_window`. Traffic that stays at or
//! under the threshold does not restart the window; only going over it does,
//! and the window starts again when the count drops back. This is the rule
//! Chrome uses for its `networkAlmostIdle` lifecycle event.
//!
//! The detector consumes an abstract stream of [`NetworkSignal`]s so it can
//! be driven by CDP events in production and by plain streams in tests.

use crate::error::BrowserError;
use futures::{Stream, StreamExt};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::trace;

/// A change in the set of in-flight requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkSignal {
    /// A request with this id was sent.
    Started(String),
    /// A request with this id finished or failed.
    Settled(String),
}

/// Resolve once the network has been quiet enough for long enough.
///
/// Never times out on its own; callers bound it.
///
/// # Errors
///
/// [`BrowserError::Page`] if the signal stream ends while more than
/// `max_inflight` requests are still pending.
pub async fn wait_for_idle<S>(
    signals: S,
    max_inflight: usize,
    quiet_window: Duration,
) -> Result<(), BrowserError>
where
    S: Stream<Item = NetworkSignal>,
{
    tokio::pin!(signals);
    let quiet = sleep(quiet_window);
    tokio::pin!(quiet);
    let mut inflight: HashSet<String> = HashSet::new();
    let mut idle = true;

    loop {
        tokio::select! {
            signal = signals.next() => match signal {
                Some(NetworkSignal::Started(id)) => {
                    inflight.insert(id);
                }
                Some(NetworkSignal::Settled(id)) => {
                    inflight.remove(&id);
                }
                None if inflight.len() <= max_inflight => return Ok(()),
                None => {
                    return Err(BrowserError::Page(format!(
                        "network event stream closed with {} requests in flight",
                        inflight.len()
                    )));
                }
            },
            _ = &mut quiet, if idle => return Ok(()),
        }

        let now_idle = inflight.len() <= max_inflight;
        if now_idle && !idle {
            // back under the threshold: the quiet window starts over
            quiet.as_mut().reset(Instant::now() + quiet_window);
        }
        idle = now_idle;
        trace!(inflight = inflight.len(), idle, "Network activity");
    }
}
