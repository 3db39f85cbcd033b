//! The polling loop state machine.
//!
//! Fetching → Processing → Advancing → (Waiting) → Fetching. A successful
//! file advances to the next sequence immediately so a backlog drains
//! quickly; an unsuccessful fetch (or an abandoned file) waits out the
//! poll interval and retries the SAME sequence. The loop runs until
//! externally terminated, or until the optional `max_files` cap.
//!
//! Crash-safety contract: the cursor is persisted after each processed
//! file and before the next fetch. A crash after the save loses nothing;
//! a crash before it replays at most the just-processed file, which the
//! admission filter's id floor turns into duplicate-safe no-ops.

use std::path::Path;

use ttt_relay_feed::{Admission, FeedError, SnapshotFetch, SnapshotSource, fetch_url, parse_snapshot};
use ttt_relay_report::{ReportDefaults, transform};
use ttt_relay_uploader::{ReportSink, UploadOutcome};

use crate::config::RunConfig;
use crate::cursor::CursorStore;
use crate::outcome::OutcomeLog;
use crate::PollError;

/// Per-file processing statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotSummary {
    /// Structurally valid data rows in the file.
    pub rows: usize,
    /// Rows skipped as structurally defective.
    pub malformed: usize,
    /// Rows that passed admission.
    pub admitted: usize,
    /// Admitted rows the downstream API accepted.
    pub accepted: usize,
    /// Admitted rows that were rejected (upload failure or unparseable
    /// timestamp).
    pub rejected: usize,
    /// Highest record id seen across the whole file, regardless of
    /// admission. Out-of-scope events still advance the resume point.
    pub max_record_id: Option<u64>,
}

impl SnapshotSummary {
    fn log(&self, sequence: u64, next_record_id: u64) {
        log::info!(
            "snapshot {sequence}: {} row(s), {} malformed, {} admitted, {} accepted, {} rejected; next record id {next_record_id}",
            self.rows,
            self.malformed,
            self.admitted,
            self.accepted,
            self.rejected,
        );
    }
}

/// Runs one snapshot's rows through admission, transformation, upload,
/// and outcome routing.
///
/// # Errors
///
/// Returns [`FeedError`] if the file itself is unusable (header mismatch,
/// CSV decoding failure); the caller treats that like a fetch failure.
/// Row-level problems never surface here; they are skipped or rejected
/// per row.
pub async fn relay_snapshot(
    bytes: &[u8],
    admission: &Admission,
    defaults: &ReportDefaults,
    sink: &dyn ReportSink,
    outcomes: &OutcomeLog,
) -> Result<SnapshotSummary, FeedError> {
    let parsed = parse_snapshot(bytes)?;

    let mut summary = SnapshotSummary {
        rows: parsed.records.len(),
        malformed: parsed.malformed,
        ..SnapshotSummary::default()
    };

    for record in parsed.records {
        summary.max_record_id =
            Some(summary.max_record_id.map_or(record.id, |max| max.max(record.id)));

        if !admission.admits(&record) {
            continue;
        }
        summary.admitted += 1;

        let outcome = match transform(&record, defaults) {
            Ok(request) => {
                let submission = sink.submit(&request).await;
                UploadOutcome::from_submission(record, submission)
            }
            Err(e) => UploadOutcome::Rejected {
                record,
                status: 0,
                reason: e.to_string(),
            },
        };

        match &outcome {
            UploadOutcome::Accepted(accepted) => {
                summary.accepted += 1;
                log::debug!("record {} accepted", accepted.id);
            }
            UploadOutcome::Rejected {
                record,
                status,
                reason,
            } => {
                summary.rejected += 1;
                log::warn!("record {} rejected ({status}): {reason}", record.id);
            }
        }

        outcomes.record(&outcome);
    }

    Ok(summary)
}

/// Polls the snapshot feed indefinitely (or until `config.max_files`
/// processed files), relaying every admitted row and persisting the
/// cursor after each file.
pub async fn watch(
    source: &dyn SnapshotSource,
    sink: &dyn ReportSink,
    config: &RunConfig,
    store: &CursorStore,
) {
    let mut cursor = store.load();
    let admission = config.admission(&cursor);
    let outcomes = OutcomeLog::new(&config.uploaded_log, &config.rejected_log);
    let mut processed: u64 = 0;

    log::info!(
        "watching the snapshot feed from sequence {} (record id floor {})",
        cursor.next_file_sequence,
        admission.start_record_id(),
    );

    loop {
        let sequence = cursor.next_file_sequence;

        match source.fetch(sequence).await {
            SnapshotFetch::Retrieved(bytes) => {
                match relay_snapshot(&bytes, &admission, &config.defaults, sink, &outcomes).await {
                    Ok(summary) => {
                        cursor.advance_records(summary.max_record_id);
                        cursor.advance_sequence(sequence);
                        if let Err(e) = store.save(&cursor) {
                            log::error!(
                                "failed to persist cursor to {}: {e}; a restart will replay snapshot {sequence}",
                                store.path().display(),
                            );
                        }
                        summary.log(sequence, cursor.next_record_id);

                        processed += 1;
                        if config.max_files.is_some_and(|max| processed >= max) {
                            log::info!("processed {processed} snapshot(s), stopping");
                            return;
                        }

                        // Fetch the next sequence immediately so a backlog
                        // drains without waiting out the poll interval.
                        continue;
                    }
                    Err(e) => {
                        log::error!("snapshot {sequence} abandoned: {e}");
                    }
                }
            }
            SnapshotFetch::NotYetAvailable(status) => {
                log::debug!("snapshot {sequence} not available yet (HTTP {status})");
            }
            SnapshotFetch::TransportError(cause) => {
                log::warn!("snapshot {sequence} fetch failed: {cause}");
            }
        }

        tokio::time::sleep(config.fetch_interval).await;
    }
}

/// Relays a single local snapshot file (degenerate one-iteration run).
///
/// # Errors
///
/// Returns [`PollError`] if the file cannot be read or is unusable as a
/// snapshot.
pub async fn relay_file(
    path: &Path,
    sink: &dyn ReportSink,
    config: &RunConfig,
    store: Option<&CursorStore>,
) -> Result<SnapshotSummary, PollError> {
    log::info!("relaying local snapshot {}", path.display());
    let bytes = std::fs::read(path)?;
    relay_once(&bytes, sink, config, store).await
}

/// Relays a single explicit snapshot URL (degenerate one-iteration run).
///
/// # Errors
///
/// Returns [`PollError`] if the fetch fails, returns a non-success
/// status, or the body is unusable as a snapshot.
pub async fn relay_url(
    client: &reqwest::Client,
    url: &str,
    gzipped: bool,
    sink: &dyn ReportSink,
    config: &RunConfig,
    store: Option<&CursorStore>,
) -> Result<SnapshotSummary, PollError> {
    log::info!("relaying snapshot from {url}");
    let bytes = fetch_url(client, url, gzipped).await?;
    relay_once(&bytes, sink, config, store).await
}

/// Shared tail of the one-shot modes: process the snapshot once and, when
/// a state file was explicitly supplied, advance the record watermark.
async fn relay_once(
    bytes: &[u8],
    sink: &dyn ReportSink,
    config: &RunConfig,
    store: Option<&CursorStore>,
) -> Result<SnapshotSummary, PollError> {
    let outcomes = OutcomeLog::new(&config.uploaded_log, &config.rejected_log);

    let mut cursor = store.map(CursorStore::load);
    let admission = cursor
        .as_ref()
        .map_or_else(|| config.admission_without_cursor(), |c| config.admission(c));

    let summary = relay_snapshot(bytes, &admission, &config.defaults, sink, &outcomes).await?;

    if let (Some(store), Some(cursor)) = (store, cursor.as_mut()) {
        cursor.advance_records(summary.max_record_id);
        if let Err(e) = store.save(cursor) {
            log::error!("failed to persist cursor to {}: {e}", store.path().display());
        }
    }

    Ok(summary)
}
