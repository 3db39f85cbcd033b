#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! TweakTheTweet record model and the fixed feed column contract.
//!
//! Every snapshot file the upstream collection service produces carries
//! exactly these 17 columns, in this order. The parser in `ttt_relay_feed`
//! rejects a whole file whose header deviates from [`FEED_HEADER`], so a
//! reshaped feed can never be processed silently.

use serde::{Deserialize, Serialize};

/// The exact header row every TtT snapshot file must carry.
pub const FEED_HEADER: [&str; 17] = [
    "EVENT",
    "Report Type",
    "Report",
    "Time - EDT",
    "Location",
    "Text",
    "Contact",
    "Details",
    "Date_Time",
    "Source",
    "COMPLETE",
    "GPS_Lat",
    "GPS_Long",
    "Photo",
    "Video",
    "Author",
    "ID",
];

/// Extra columns appended to rejected rows in the rejected-outcomes log.
pub const REJECTED_EXTRA_HEADER: [&str; 2] = ["Status", "Reason"];

/// One parsed row of a TtT snapshot file.
///
/// Field values are whitespace-trimmed at parse time. The numeric `id` is
/// the monotonically assigned TtT record identifier used as the resume
/// watermark; `id_text` preserves the cell as written for verbatim log
/// output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TttRecord {
    /// Event name as written in the feed (e.g. `"#sandy"`).
    pub event: String,
    /// Free-form report type (e.g. `"Damage"`).
    pub report_type: String,
    /// Report title.
    pub title: String,
    /// Report time in `M/D/Y H:M:S` form (feed-local timezone).
    pub time: String,
    /// Free-form location description.
    pub location: String,
    /// The tweet text.
    pub text: String,
    /// Contact details, if the author supplied any.
    pub contact: String,
    /// Additional free-form details.
    pub details: String,
    /// Collection timestamp assigned by the upstream service.
    pub date_time: String,
    /// Where the upstream service picked the report up.
    pub source: String,
    /// Upstream completeness flag.
    pub complete: String,
    /// Latitude, when the tweet was geotagged.
    pub latitude: String,
    /// Longitude, when the tweet was geotagged.
    pub longitude: String,
    /// Photo URL, if any.
    pub photo: String,
    /// Video URL, if any.
    pub video: String,
    /// Tweet author.
    pub author: String,
    /// The ID cell as written in the feed.
    pub id_text: String,
    /// Parsed numeric record id (the resume watermark).
    pub id: u64,
}

impl TttRecord {
    /// Returns the record's cells in feed column order, for verbatim
    /// output into the outcome logs.
    #[must_use]
    pub fn columns(&self) -> [&str; 17] {
        [
            &self.event,
            &self.report_type,
            &self.title,
            &self.time,
            &self.location,
            &self.text,
            &self.contact,
            &self.details,
            &self.date_time,
            &self.source,
            &self.complete,
            &self.latitude,
            &self.longitude,
            &self.photo,
            &self.video,
            &self.author,
            &self.id_text,
        ]
    }

    /// Returns the event name normalized for allow-list matching.
    #[must_use]
    pub fn normalized_event(&self) -> String {
        normalize_event_name(&self.event)
    }
}

/// Returns `true` if a feed cell should be treated as absent.
///
/// The upstream spreadsheet writes both empty cells and the literal
/// placeholder `"NA"` for missing values.
#[must_use]
pub fn is_absent(value: &str) -> bool {
    value.is_empty() || value == "NA"
}

/// Normalizes an event name for allow-list matching: strips one leading
/// `#` marker and lower-cases the rest.
#[must_use]
pub fn normalize_event_name(event: &str) -> String {
    event.strip_prefix('#').unwrap_or(event).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_event(event: &str) -> TttRecord {
        TttRecord {
            event: event.to_owned(),
            report_type: String::new(),
            title: String::new(),
            time: String::new(),
            location: String::new(),
            text: String::new(),
            contact: String::new(),
            details: String::new(),
            date_time: String::new(),
            source: String::new(),
            complete: String::new(),
            latitude: String::new(),
            longitude: String::new(),
            photo: String::new(),
            video: String::new(),
            author: String::new(),
            id_text: "7".to_owned(),
            id: 7,
        }
    }

    #[test]
    fn header_contract_has_17_columns() {
        assert_eq!(FEED_HEADER.len(), 17);
        assert_eq!(FEED_HEADER[0], "EVENT");
        assert_eq!(FEED_HEADER[16], "ID");
    }

    #[test]
    fn normalizes_marker_and_case() {
        assert_eq!(normalize_event_name("#Sandy"), "sandy");
        assert_eq!(normalize_event_name("ISAAC"), "isaac");
    }

    #[test]
    fn strips_only_one_leading_marker() {
        assert_eq!(normalize_event_name("##sandy"), "#sandy");
    }

    #[test]
    fn na_and_empty_are_absent() {
        assert!(is_absent(""));
        assert!(is_absent("NA"));
        assert!(!is_absent("na"));
        assert!(!is_absent("Astoria Park"));
    }

    #[test]
    fn columns_follow_header_order() {
        let record = record_with_event("#sandy");
        let columns = record.columns();
        assert_eq!(columns.len(), FEED_HEADER.len());
        assert_eq!(columns[0], "#sandy");
        assert_eq!(columns[16], "7");
    }

    #[test]
    fn normalized_event_uses_event_cell() {
        assert_eq!(record_with_event("#Sandy").normalized_event(), "sandy");
    }
}
