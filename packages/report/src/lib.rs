#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Maps admitted TtT rows into downstream create-report requests.
//!
//! The transformer applies the relay's substitution policy: default
//! location and title labels for absent cells, a distinct no-location
//! category plus default coordinates when the row lacks geocoordinates,
//! and a provenance tag in the description so the originating record id
//! survives the transformation.

pub mod time;

use serde::{Deserialize, Serialize};
use ttt_relay_feed_models::{TttRecord, is_absent};

pub use time::{SplitTime, split_report_time};

/// Row-local transformation failures. The affected row is rejected,
/// never silently dropped.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// The time column does not match `M/D/Y H:M:S`.
    #[error("unparseable timestamp {value:?}: expected M/D/Y H:M:S")]
    UnparseableTimestamp {
        /// The offending time cell.
        value: String,
    },
}

/// Immutable substitution policy for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDefaults {
    /// Category id assigned to reports that carry coordinates.
    pub category: String,
    /// Category id assigned when latitude or longitude is absent, so
    /// downstream consumers can triage geolocation-missing reports
    /// separately.
    pub no_location_category: String,
    /// Latitude substituted when the row lacks coordinates.
    pub default_latitude: String,
    /// Longitude substituted when the row lacks coordinates.
    pub default_longitude: String,
    /// Title substituted when the row's title is absent. When `None`, the
    /// row's normalized event name is used instead.
    pub default_title: Option<String>,
    /// Location label substituted when the row's location is absent.
    pub default_location: String,
}

/// One fully-formed downstream create-report request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    /// Report title.
    pub title: String,
    /// Report description, ending with the provenance tag.
    pub description: String,
    /// Date in `M/D/Y` form.
    pub date: String,
    /// Hour on a 12-hour clock.
    pub hour: String,
    /// Minute.
    pub minute: String,
    /// `"am"` or `"pm"`.
    pub meridiem: String,
    /// Category id.
    pub category: String,
    /// Latitude (row value or configured default).
    pub latitude: String,
    /// Longitude (row value or configured default).
    pub longitude: String,
    /// Location label.
    pub location_name: String,
    /// Photo URL, when the row carried one.
    pub photo: Option<String>,
    /// Video URL, when the row carried one.
    pub video: Option<String>,
}

/// Transforms an admitted row into a create-report request.
///
/// # Errors
///
/// Returns [`TransformError::UnparseableTimestamp`] if the row's time
/// column cannot be split; the caller records the row as rejected.
pub fn transform(record: &TttRecord, defaults: &ReportDefaults) -> Result<ReportRequest, TransformError> {
    let split = split_report_time(&record.time)?;

    let location_name = if is_absent(&record.location) {
        defaults.default_location.clone()
    } else {
        record.location.clone()
    };

    let title = if is_absent(&record.title) {
        defaults
            .default_title
            .clone()
            .unwrap_or_else(|| record.normalized_event())
    } else {
        record.title.clone()
    };

    let mut description = record.text.clone();
    if !is_absent(&record.report_type) {
        description.push_str(" Type: ");
        description.push_str(&record.report_type);
    }
    if !is_absent(&record.details) {
        description.push_str(" Details: ");
        description.push_str(&record.details);
    }
    description.push_str(&format!(" TweakTheTweet ID is {}", record.id));

    let (category, latitude, longitude) =
        if is_absent(&record.latitude) || is_absent(&record.longitude) {
            (
                defaults.no_location_category.clone(),
                defaults.default_latitude.clone(),
                defaults.default_longitude.clone(),
            )
        } else {
            (
                defaults.category.clone(),
                record.latitude.clone(),
                record.longitude.clone(),
            )
        };

    let optional = |value: &str| {
        if is_absent(value) {
            None
        } else {
            Some(value.to_owned())
        }
    };

    Ok(ReportRequest {
        title,
        description,
        date: split.date,
        hour: split.hour,
        minute: split.minute,
        meridiem: split.meridiem,
        category,
        latitude,
        longitude,
        location_name,
        photo: optional(&record.photo),
        video: optional(&record.video),
    })
}
