#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The downstream create-report interface and its HTTP implementation.
//!
//! Each admitted row becomes exactly one [`ReportSink::submit`] call. There
//! is deliberately no retry at this layer: retry policy lives at the
//! file-fetch level, and a row's failure is terminal for that row.

pub mod http;

use async_trait::async_trait;
use ttt_relay_feed_models::TttRecord;
use ttt_relay_report::ReportRequest;

pub use http::HttpUploader;

/// Errors raised below the HTTP status layer (DNS, connect, timeout).
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The request never produced an HTTP status.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// The downstream API's verdict on one create-report call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    /// HTTP 200.
    Accepted,
    /// Any other status.
    Rejected {
        /// HTTP status code returned.
        status: u16,
        /// Human-readable reason for the rejection.
        reason: String,
    },
}

/// Interface to the downstream create-report call.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Performs one create-report call and classifies the result.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError`] only for transport-level failures; any
    /// HTTP response, success or not, is a classified [`SubmitResult`].
    async fn submit(&self, request: &ReportRequest) -> Result<SubmitResult, UploadError>;
}

/// The per-row delivery outcome routed into the outcome logs.
///
/// Consumed exactly once by the outcome router, never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The downstream API accepted the report.
    Accepted(TttRecord),
    /// The report was not delivered. `status` is the HTTP status code, or
    /// `0` when the rejection happened without an HTTP response (transport
    /// failure, unparseable timestamp).
    Rejected {
        /// The originating feed row.
        record: TttRecord,
        /// HTTP status code, or 0 for a non-HTTP rejection.
        status: u16,
        /// Human-readable reason.
        reason: String,
    },
}

impl UploadOutcome {
    /// Folds a sink submission result into a per-row outcome, classifying
    /// transport failures as status-0 rejections.
    #[must_use]
    pub fn from_submission(
        record: TttRecord,
        submission: Result<SubmitResult, UploadError>,
    ) -> Self {
        match submission {
            Ok(SubmitResult::Accepted) => Self::Accepted(record),
            Ok(SubmitResult::Rejected { status, reason }) => Self::Rejected {
                record,
                status,
                reason,
            },
            Err(e) => Self::Rejected {
                record,
                status: 0,
                reason: e.to_string(),
            },
        }
    }

    /// The feed row this outcome is about.
    #[must_use]
    pub const fn record(&self) -> &TttRecord {
        match self {
            Self::Accepted(record) | Self::Rejected { record, .. } => record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TttRecord {
        TttRecord {
            event: "#sandy".to_owned(),
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
            id_text: "5".to_owned(),
            id: 5,
        }
    }

    #[test]
    fn accepted_submission_becomes_accepted_outcome() {
        let outcome = UploadOutcome::from_submission(record(), Ok(SubmitResult::Accepted));
        assert!(matches!(outcome, UploadOutcome::Accepted(_)));
    }

    #[test]
    fn rejected_submission_keeps_status_and_reason() {
        let outcome = UploadOutcome::from_submission(
            record(),
            Ok(SubmitResult::Rejected {
                status: 403,
                reason: "Forbidden".to_owned(),
            }),
        );
        assert_eq!(
            outcome,
            UploadOutcome::Rejected {
                record: record(),
                status: 403,
                reason: "Forbidden".to_owned(),
            }
        );
    }
}
