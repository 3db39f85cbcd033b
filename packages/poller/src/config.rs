//! Run configuration.
//!
//! One immutable struct assembled at startup from the command line and
//! passed explicitly into the poll loop and its sub-components; nothing in
//! the relay mutates configuration after that.

use std::path::PathBuf;
use std::time::Duration;

use ttt_relay_feed::Admission;
use ttt_relay_report::ReportDefaults;

use crate::cursor::ResumeCursor;

/// Immutable configuration for one relay run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Event names to admit (normalized by the admission filter).
    pub allowed_events: Vec<String>,
    /// Configured record-id floor. The effective floor also honors the
    /// persisted cursor; see [`RunConfig::admission`].
    pub start_record_id: u64,
    /// Substitution policy for the report transformer.
    pub defaults: ReportDefaults,
    /// Path of the accepted-outcomes log.
    pub uploaded_log: PathBuf,
    /// Path of the rejected-outcomes log.
    pub rejected_log: PathBuf,
    /// How long the poll loop waits after an unsuccessful fetch.
    pub fetch_interval: Duration,
    /// Stop after this many processed files (`None` = run indefinitely).
    pub max_files: Option<u64>,
}

impl RunConfig {
    /// Builds the run's admission policy from the persisted cursor: the
    /// effective id floor is the configured start id or the cursor's next
    /// record id, whichever is higher.
    #[must_use]
    pub fn admission(&self, cursor: &ResumeCursor) -> Admission {
        Admission::new(
            self.allowed_events.iter().cloned(),
            self.start_record_id.max(cursor.next_record_id),
        )
    }

    /// Builds an admission policy from the configured floor alone, for
    /// one-shot runs without a state file.
    #[must_use]
    pub fn admission_without_cursor(&self) -> Admission {
        Admission::new(self.allowed_events.iter().cloned(), self.start_record_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(start_record_id: u64) -> RunConfig {
        RunConfig {
            allowed_events: vec!["sandy".to_owned()],
            start_record_id,
            defaults: ReportDefaults {
                category: "67".to_owned(),
                no_location_category: "68".to_owned(),
                default_latitude: "0.0".to_owned(),
                default_longitude: "0.0".to_owned(),
                default_title: None,
                default_location: "Undefined".to_owned(),
            },
            uploaded_log: PathBuf::from("uploaded.csv"),
            rejected_log: PathBuf::from("rejected.csv"),
            fetch_interval: Duration::ZERO,
            max_files: None,
        }
    }

    #[test]
    fn persisted_cursor_raises_the_floor() {
        let cursor = ResumeCursor {
            next_record_id: 40,
            next_file_sequence: 9,
            updated_at: None,
        };
        assert_eq!(config(1).admission(&cursor).start_record_id(), 40);
    }

    #[test]
    fn configured_floor_wins_when_higher() {
        let cursor = ResumeCursor::default();
        assert_eq!(config(25).admission(&cursor).start_record_id(), 25);
    }
}
