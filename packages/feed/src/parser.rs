//! Snapshot CSV parser.
//!
//! Enforces the fixed 17-column header contract for the whole file, then
//! parses data rows individually: a structurally defective row is skipped
//! and logged rather than aborting the file.

use ttt_relay_feed_models::{FEED_HEADER, TttRecord};

use crate::{FeedError, RowError};

/// The result of parsing one snapshot file.
#[derive(Debug)]
pub struct ParsedSnapshot {
    /// Rows that passed structural validation, in file order.
    pub records: Vec<TttRecord>,
    /// Number of rows skipped as structurally defective.
    pub malformed: usize,
}

/// Parses the raw bytes of one snapshot file.
///
/// # Errors
///
/// Returns [`FeedError::HeaderMismatch`] if the header row deviates from
/// [`FEED_HEADER`] in order or text, or [`FeedError::Csv`] if CSV decoding
/// fails mid-file. Either way the whole file is abandoned.
pub fn parse_snapshot(bytes: &[u8]) -> Result<ParsedSnapshot, FeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect();

    if headers.iter().map(String::as_str).ne(FEED_HEADER) {
        return Err(FeedError::HeaderMismatch { found: headers });
    }

    let mut records = Vec::new();
    let mut malformed = 0;

    for (index, result) in reader.records().enumerate() {
        let raw = result?;
        match parse_row(&raw) {
            Ok(record) => records.push(record),
            Err(defect) => {
                // Line 1 is the header row.
                log::warn!("skipping snapshot line {}: {defect}", index + 2);
                malformed += 1;
            }
        }
    }

    Ok(ParsedSnapshot { records, malformed })
}

/// Parses one data row into a [`TttRecord`], trimming every cell.
fn parse_row(raw: &csv::StringRecord) -> Result<TttRecord, RowError> {
    if raw.len() != FEED_HEADER.len() {
        return Err(RowError::FieldCount { found: raw.len() });
    }

    let cell = |index: usize| raw.get(index).unwrap_or("").trim().to_owned();

    let id_text = cell(16);
    let id = id_text
        .parse::<u64>()
        .map_err(|_| RowError::BadId { value: id_text.clone() })?;

    Ok(TttRecord {
        event: cell(0),
        report_type: cell(1),
        title: cell(2),
        time: cell(3),
        location: cell(4),
        text: cell(5),
        contact: cell(6),
        details: cell(7),
        date_time: cell(8),
        source: cell(9),
        complete: cell(10),
        latitude: cell(11),
        longitude: cell(12),
        photo: cell(13),
        video: cell(14),
        author: cell(15),
        id_text,
        id,
    })
}
