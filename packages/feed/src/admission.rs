//! Row admission filter.
//!
//! Decides, per parsed row, whether the relay should process it: the
//! event name (normalized) must be on the allow-list, and the record id
//! must be at or above the resume floor.

use std::collections::BTreeSet;

use ttt_relay_feed_models::{TttRecord, normalize_event_name};

/// Immutable admission policy for one run.
#[derive(Debug, Clone)]
pub struct Admission {
    /// Normalized event names the relay is willing to process.
    allowed_events: BTreeSet<String>,
    /// Records with an id below this floor have already been attempted in
    /// an earlier run and are silently passed over.
    start_record_id: u64,
}

impl Admission {
    /// Creates an admission policy. Event names are normalized on the way
    /// in, so `"#Sandy"` and `"sandy"` configure the same allow-list entry.
    #[must_use]
    pub fn new(allowed_events: impl IntoIterator<Item = String>, start_record_id: u64) -> Self {
        Self {
            allowed_events: allowed_events
                .into_iter()
                .map(|event| normalize_event_name(&event))
                .collect(),
            start_record_id,
        }
    }

    /// The id floor this policy was built with.
    #[must_use]
    pub const fn start_record_id(&self) -> u64 {
        self.start_record_id
    }

    /// Returns `true` if the row is in scope: allow-listed event AND id at
    /// or above the resume floor. An empty allow-list admits nothing.
    #[must_use]
    pub fn admits(&self, record: &TttRecord) -> bool {
        !self.allowed_events.is_empty()
            && self.allowed_events.contains(&record.normalized_event())
            && record.id >= self.start_record_id
    }
}
