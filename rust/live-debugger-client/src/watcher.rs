//! Keeps the debugger's view of the page's session set fresh.
//!
//! The page calls [`MutationWatcher::observe`] once per mutation-observer
//! batch; the watcher reads the sessions mounted *now*, so intermediate DOM
//! states inside a batch are never seen. A changed fingerprint is pushed
//! together with the last acknowledged one, and only becomes the new
//! baseline once the debugger has accepted it.
//!
//! At most one push is in flight. Batches that arrive meanwhile only mark
//! the watcher dirty; once the reply lands the session set is read again
//! and pushed again if it still differs from the baseline, so the debugger
//! always ends up with the net effect of the DOM.

use live_debugger_common::SharedCell;

use crate::fingerprint::compute_fingerprint;
use crate::protocol::Outbound;
use crate::surface::Sessions;
use crate::transport::Transport;

/// Result of observing one mutation batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The session set did not change
    Unchanged,
    /// The debugger accepted a new fingerprint (the last one pushed, when
    /// the set moved again while a push was in flight)
    Committed {
        /// The new baseline
        fingerprint: String,
        /// The baseline it replaced
        previous: String,
    },
    /// The push failed; the old baseline stays
    Rejected,
    /// A push was already in flight; its owner re-reads the session set
    /// when it settles
    Deferred,
}

/// Tracks the last fingerprint the debugger acknowledged.
#[derive(Debug)]
pub struct MutationWatcher<T> {
    transport: T,
    baseline: SharedCell<String>,
    in_flight: SharedCell<bool>,
    dirty: SharedCell<bool>,
}

impl<T> MutationWatcher<T>
where
    T: Transport,
{
    /// Start from the fingerprint the channel was joined with.
    pub fn new(transport: T, baseline: String) -> Self {
        Self {
            transport,
            baseline: SharedCell::new(baseline),
            in_flight: SharedCell::new(false),
            dirty: SharedCell::new(false),
        }
    }

    /// The last acknowledged fingerprint.
    pub fn baseline(&self) -> String {
        self.baseline.get()
    }

    /// Recompute the fingerprint from the sessions mounted in `page` and
    /// push it if it moved.
    ///
    /// Transport failures are logged and reported as
    /// [`WatchOutcome::Rejected`]; they are never returned as errors because
    /// the caller is a mutation-observer callback. A rejected push is retried
    /// right away only if another batch arrived while it was in flight;
    /// otherwise the next batch retries from the same baseline.
    pub async fn observe<P>(&self, page: &P) -> WatchOutcome
    where
        P: Sessions,
    {
        if self.in_flight.replace(true) {
            self.dirty.replace(true);
            return WatchOutcome::Deferred;
        }

        let mut outcome = WatchOutcome::Unchanged;

        loop {
            self.dirty.replace(false);

            let fingerprint = compute_fingerprint(page.session_ids());
            let previous = self.baseline.get();

            if fingerprint == previous {
                break;
            }

            tracing::debug!("Session fingerprint moved from '{previous}' to '{fingerprint}'");

            let update = Outbound::UpdateFingerprint {
                fingerprint: fingerprint.clone(),
                previous_fingerprint: previous.clone(),
            };

            match self.transport.push(update).await {
                Ok(()) => {
                    self.baseline.replace(fingerprint.clone());
                    outcome = WatchOutcome::Committed {
                        fingerprint,
                        previous,
                    };
                }
                Err(error) => {
                    tracing::error!("Failed to update fingerprint: {error}");
                    outcome = WatchOutcome::Rejected;

                    if !self.dirty.get() {
                        break;
                    }
                }
            }
        }

        self.in_flight.replace(false);
        outcome
    }
}
