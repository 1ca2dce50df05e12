//! Streamer filter state.
//!
//! One filter, no stacking: setting a new one supersedes the previous.
//! The controller only records the desired scope and answers what intent a
//! change (or a fresh open) requires — the connection driver owns the
//! actual sends, including the documented re-send of the last known filter
//! on every successful open.

use std::sync::{Mutex, PoisonError};

use recsync_core::progress::ClientIntent;

/// Tracks the single desired streamer filter.
#[derive(Debug, Default)]
pub struct SubscriptionController {
    filter: Mutex<Option<String>>,
}

impl SubscriptionController {
    /// Controller with no filter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the filter and return the intent the change requires:
    /// `Subscribe` for a new scope, `Unsubscribe` when clearing.
    pub fn replace(&self, streamer_id: Option<String>) -> ClientIntent {
        let intent = streamer_id.clone().map_or(ClientIntent::Unsubscribe, |id| {
            ClientIntent::Subscribe { streamer_id: id }
        });
        *self.lock() = streamer_id;
        intent
    }

    /// The currently desired filter.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.lock().clone()
    }

    /// Intent to (re-)establish the filter after an open, if one is set.
    #[must_use]
    pub fn resend_intent(&self) -> Option<ClientIntent> {
        self.lock().clone().map(|id| ClientIntent::Subscribe {
            streamer_id: id,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.filter.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
