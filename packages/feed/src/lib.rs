#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! TtT snapshot fetching, parsing, and row admission.
//!
//! A snapshot is one sequentially numbered CSV file produced by the
//! upstream collection service. This crate downloads snapshots
//! ([`fetch::HttpFeed`]), enforces the fixed column contract
//! ([`parser::parse_snapshot`]), and decides which rows are in scope for
//! relaying ([`admission::Admission`]).

pub mod admission;
pub mod fetch;
pub mod parser;

pub use admission::Admission;
pub use fetch::{HttpFeed, SnapshotFetch, SnapshotSource, fetch_url};
pub use parser::{ParsedSnapshot, parse_snapshot};

/// Errors that can occur while fetching or parsing a snapshot file.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The file's header row does not match the fixed TtT column contract.
    /// The whole file is abandoned; a reshaped feed must never be
    /// processed partially.
    #[error("snapshot header does not match the TtT column contract: found {found:?}")]
    HeaderMismatch {
        /// The header cells actually present in the file.
        found: Vec<String>,
    },

    /// CSV decoding failed mid-file.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An I/O operation failed (local file reads, gzip decoding).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A single-URL fetch returned a non-success status. Only one-shot
    /// mode surfaces this; the polling loop treats any non-success status
    /// as the not-yet-available wait signal instead.
    #[error("unexpected HTTP status {status} fetching {url}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code returned.
        status: u16,
    },
}

/// Structural defects that disqualify a single data row.
///
/// Row-local by design: a defective row is skipped and logged, it never
/// aborts the file it arrived in.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    /// The row does not carry exactly the 17 contract fields.
    #[error("expected 17 fields, found {found}")]
    FieldCount {
        /// Number of fields actually present.
        found: usize,
    },

    /// The ID cell is not a non-negative integer.
    #[error("ID cell {value:?} is not numeric")]
    BadId {
        /// The offending cell content.
        value: String,
    },
}
