//! Durable resume state.
//!
//! The cursor is the only state that survives a file boundary or a process
//! restart: the next unprocessed record id and the next file sequence
//! number, kept in a small human-readable TOML file. A missing or corrupt
//! file degrades to the defaults with a warning; losing a partial write
//! costs at most one file's progress, which the admission filter's id
//! floor makes safe to re-process.
//!
//! Single-instance deployment is assumed: nothing else reads or writes the
//! cursor file while the relay runs, so no file locking is used.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors raised while persisting the cursor.
#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    /// Writing the cursor file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the cursor record failed.
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// The persisted resume position. Both counters are monotonically
/// non-decreasing across the process's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeCursor {
    /// Id of the next record that has not been attempted yet.
    pub next_record_id: u64,
    /// Sequence number of the next snapshot file to fetch.
    pub next_file_sequence: u64,
    /// When the cursor was last advanced (informational).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Default for ResumeCursor {
    fn default() -> Self {
        Self {
            next_record_id: 1,
            next_file_sequence: 1,
            updated_at: None,
        }
    }
}

impl ResumeCursor {
    /// Advances the record watermark past the highest id observed in a
    /// fully scanned file. A file with no observable ids leaves the
    /// watermark untouched; the cursor never moves backward.
    pub fn advance_records(&mut self, max_observed_id: Option<u64>) {
        if let Some(max_id) = max_observed_id {
            self.next_record_id = self.next_record_id.max(max_id + 1);
        }
        self.touch();
    }

    /// Advances the file watermark past a fully processed sequence number.
    pub fn advance_sequence(&mut self, processed_sequence: u64) {
        self.next_file_sequence = self.next_file_sequence.max(processed_sequence + 1);
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Some(chrono::Utc::now().to_rfc3339());
    }
}

/// Reads and writes the durable cursor record.
#[derive(Debug, Clone)]
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    /// Creates a store over the given cursor file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The cursor file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted cursor. A missing or unparsable file yields the
    /// (1, 1) defaults; startup must tolerate both.
    #[must_use]
    pub fn load(&self) -> ResumeCursor {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!(
                    "no cursor file at {}; starting from the beginning",
                    self.path.display()
                );
                return ResumeCursor::default();
            }
            Err(e) => {
                log::warn!(
                    "could not read cursor file {}: {e}; starting from the beginning",
                    self.path.display()
                );
                return ResumeCursor::default();
            }
        };

        match toml::from_str::<ResumeCursor>(&contents) {
            Ok(mut cursor) => {
                // The counters are 1-based; a hand-edited 0 would admit
                // nothing new and never advance.
                cursor.next_record_id = cursor.next_record_id.max(1);
                cursor.next_file_sequence = cursor.next_file_sequence.max(1);
                cursor
            }
            Err(e) => {
                log::warn!(
                    "cursor file {} is unparsable: {e}; starting from the beginning",
                    self.path.display()
                );
                ResumeCursor::default()
            }
        }
    }

    /// Persists the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`CursorError`] if serialization or the write fails. The
    /// caller surfaces this loudly (a stale cursor risks re-sent or
    /// skipped work after a restart) but keeps processing.
    pub fn save(&self, cursor: &ResumeCursor) -> Result<(), CursorError> {
        let contents = toml::to_string(cursor)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> CursorStore {
        CursorStore::new(dir.path().join("state.toml"))
    }

    #[test]
    fn missing_file_defaults_to_one_one() {
        let dir = tempfile::tempdir().unwrap();
        let cursor = store_in(&dir).load();
        assert_eq!(cursor.next_record_id, 1);
        assert_eq!(cursor.next_file_sequence, 1);
    }

    #[test]
    fn round_trips_the_resume_position() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let mut cursor = ResumeCursor::default();
        cursor.advance_records(Some(41));
        cursor.advance_sequence(7);
        store.save(&cursor).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.next_record_id, 42);
        assert_eq!(loaded.next_file_sequence, 8);
        assert!(loaded.updated_at.is_some());
    }

    #[test]
    fn corrupt_file_defaults_to_one_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "next_record_id = \"not a number").unwrap();

        let cursor = store.load();
        assert_eq!(cursor.next_record_id, 1);
        assert_eq!(cursor.next_file_sequence, 1);
    }

    #[test]
    fn zero_counters_are_clamped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "next_record_id = 0\nnext_file_sequence = 0\n").unwrap();

        let cursor = store.load();
        assert_eq!(cursor.next_record_id, 1);
        assert_eq!(cursor.next_file_sequence, 1);
    }

    #[test]
    fn cursor_never_moves_backward() {
        let mut cursor = ResumeCursor {
            next_record_id: 10,
            next_file_sequence: 3,
            updated_at: None,
        };

        cursor.advance_records(Some(4));
        assert_eq!(cursor.next_record_id, 10);

        cursor.advance_records(None);
        assert_eq!(cursor.next_record_id, 10);

        cursor.advance_sequence(1);
        assert_eq!(cursor.next_file_sequence, 3);
    }
}
