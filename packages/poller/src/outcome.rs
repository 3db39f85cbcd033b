//! Outcome router.
//!
//! Appends each per-row delivery outcome to one of two CSV logs: accepted
//! rows verbatim, rejected rows with the status code and reason appended.
//! The logs are diagnostic, not part of the delivery guarantee (that lives
//! in the cursor), so writing is best-effort: a failure is reported to the
//! operator and processing continues.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use ttt_relay_feed_models::{FEED_HEADER, REJECTED_EXTRA_HEADER};
use ttt_relay_uploader::UploadOutcome;

/// Append-style accepted/rejected CSV logs.
#[derive(Debug, Clone)]
pub struct OutcomeLog {
    uploaded_path: PathBuf,
    rejected_path: PathBuf,
}

impl OutcomeLog {
    /// Creates a router over the two log paths. Files are created on first
    /// append, each with its header row.
    pub fn new(uploaded_path: impl Into<PathBuf>, rejected_path: impl Into<PathBuf>) -> Self {
        Self {
            uploaded_path: uploaded_path.into(),
            rejected_path: rejected_path.into(),
        }
    }

    /// Appends one outcome to the matching log. Best-effort: failures are
    /// logged, never propagated.
    pub fn record(&self, outcome: &UploadOutcome) {
        let result = match outcome {
            UploadOutcome::Accepted(record) => {
                append_row(&self.uploaded_path, &FEED_HEADER, &record.columns())
            }
            UploadOutcome::Rejected {
                record,
                status,
                reason,
            } => {
                let mut header: Vec<&str> = FEED_HEADER.to_vec();
                header.extend(REJECTED_EXTRA_HEADER);

                let mut row: Vec<String> =
                    record.columns().iter().map(|&cell| cell.to_owned()).collect();
                row.push(status.to_string());
                row.push(reason.clone());

                append_row(&self.rejected_path, &header, &row)
            }
        };

        if let Err(e) = result {
            log::error!(
                "failed to log outcome for record {}: {e}",
                outcome.record().id
            );
        }
    }
}

/// Appends one row, writing the header first when the file is new or empty.
fn append_row<C>(path: &Path, header: &[&str], row: &[C]) -> Result<(), csv::Error>
where
    C: AsRef<[u8]>,
{
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let is_empty = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    if is_empty {
        writer.write_record(header)?;
    }
    writer.write_record(row)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use ttt_relay_feed_models::TttRecord;

    use super::*;

    fn record(id: u64) -> TttRecord {
        TttRecord {
            event: "#sandy".to_owned(),
            report_type: String::new(),
            title: String::new(),
            time: "10/29/2012 14:05:00".to_owned(),
            location: String::new(),
            text: "Flooded st".to_owned(),
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
            id_text: id.to_string(),
            id,
        }
    }

    fn logs_in(dir: &tempfile::TempDir) -> (OutcomeLog, PathBuf, PathBuf) {
        let uploaded = dir.path().join("uploaded.csv");
        let rejected = dir.path().join("rejected.csv");
        (OutcomeLog::new(&uploaded, &rejected), uploaded, rejected)
    }

    #[test]
    fn accepted_rows_get_the_feed_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let (outcomes, uploaded, _) = logs_in(&dir);

        outcomes.record(&UploadOutcome::Accepted(record(5)));
        outcomes.record(&UploadOutcome::Accepted(record(6)));

        let contents = std::fs::read_to_string(uploaded).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("EVENT,Report Type,"));
        assert!(lines[1].ends_with(",5"));
        assert!(lines[2].ends_with(",6"));
    }

    #[test]
    fn rejected_rows_carry_status_and_reason() {
        let dir = tempfile::tempdir().unwrap();
        let (outcomes, _, rejected) = logs_in(&dir);

        outcomes.record(&UploadOutcome::Rejected {
            record: record(9),
            status: 403,
            reason: "Forbidden".to_owned(),
        });

        let contents = std::fs::read_to_string(rejected).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert!(lines[0].ends_with(",Status,Reason"));
        assert!(lines[1].ends_with(",9,403,Forbidden"));
    }

    #[test]
    fn unwritable_log_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let blocked = dir.path().join("missing-dir").join("uploaded.csv");
        let outcomes = OutcomeLog::new(blocked, dir.path().join("rejected.csv"));

        outcomes.record(&UploadOutcome::Accepted(record(5)));
    }
}
