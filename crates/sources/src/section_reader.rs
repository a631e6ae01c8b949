//! Section reader
//!
//! Streams one CSV file, grouping contiguous equal-timestamp runs of body
//! rows into sections and sending them downstream. Rows of one timestamp
//! are contiguous in the source; a section is closed when the next row's
//! timestamp differs.

use std::fs::File;
use std::io::{BufReader, Read};
use std::mem;
use std::path::Path;

use csv::StringRecord;
use rtdb_protocol::{RowOutcome, RowRecord, Section};
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cr_filter::CrFilterReader;
use crate::error::SourceError;

/// Open `path` and stream its sections into `tx` on a blocking task.
///
/// The open happens here, synchronously, so an unreadable input aborts the
/// run before any task is spawned. EOF is signaled by dropping `tx`.
pub fn spawn_section_reader<T: RowRecord>(
    path: &Path,
    tx: mpsc::Sender<Section<T>>,
    cancel: CancellationToken,
) -> crate::Result<JoinHandle<()>> {
    let file = File::open(path).map_err(|source| SourceError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let label = path.display().to_string();
    Ok(task::spawn_blocking(move || {
        read_sections_from(BufReader::new(file), &label, tx, cancel)
    }))
}

/// Section-grouping loop over any byte stream. Exposed for tests.
///
/// Malformed rows are logged and skipped; header and tail rows are skipped
/// silently. On cancellation the unflushed partial section is discarded and
/// the channel closes without further input being read.
pub fn read_sections_from<T: RowRecord, R: Read>(
    input: R,
    label: &str,
    tx: mpsc::Sender<Section<T>>,
    cancel: CancellationToken,
) {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(CrFilterReader::new(input));

    let mut current_ts = -1i64;
    let mut buffer: Vec<T> = Vec::new();
    let mut row = StringRecord::new();
    let mut sections = 0u64;

    loop {
        if cancel.is_cancelled() {
            debug!(file = label, sections, "reader cancelled, discarding partial section");
            return;
        }

        match reader.read_record(&mut row) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                warn!(file = label, error = %e, "error reading record");
                continue;
            }
        }

        let (timestamp, record) = match T::decode(&row) {
            Ok(RowOutcome::Record { timestamp, record }) => (timestamp, record),
            Ok(RowOutcome::Header) | Ok(RowOutcome::Tail) => continue,
            Err(e) => {
                warn!(file = label, error = %e, "error parsing record");
                continue;
            }
        };

        if current_ts == -1 {
            current_ts = timestamp;
        }

        if timestamp != current_ts {
            if !buffer.is_empty() {
                let section = Section::new(current_ts, mem::take(&mut buffer));
                sections += 1;
                if tx.blocking_send(section).is_err() {
                    // receiver gone; the writer is shutting down
                    return;
                }
            }
            current_ts = timestamp;
        }

        buffer.push(record);
    }

    if !buffer.is_empty() {
        sections += 1;
        let _ = tx.blocking_send(Section::new(current_ts, buffer));
    }

    debug!(file = label, sections, "reader finished");
}

#[cfg(test)]
#[path = "section_reader_test.rs"]
mod section_reader_test;
