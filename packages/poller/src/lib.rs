#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Polling loop and resume state for the TtT relay.
//!
//! Orchestrates fetch-one-file → process-all-rows → advance-cursor →
//! wait, indefinitely. Delivery is at-least-once: the cursor is persisted
//! after every processed file, and the admission filter's id floor turns
//! any re-processed rows into no-ops on restart.

pub mod config;
pub mod cursor;
pub mod outcome;
pub mod poll;

pub use config::RunConfig;
pub use cursor::{CursorError, CursorStore, ResumeCursor};
pub use outcome::OutcomeLog;
pub use poll::{SnapshotSummary, relay_file, relay_snapshot, relay_url, watch};

/// Top-level errors surfaced to the relay binary.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// Fetching or parsing a snapshot failed in a one-shot run (the
    /// polling loop absorbs these into its wait-and-retry cycle instead).
    #[error("feed error: {0}")]
    Feed(#[from] ttt_relay_feed::FeedError),

    /// A local file operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
