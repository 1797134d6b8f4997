use crate::filter::{FilterId, FilterStore, RegistryError, ResultRecord};
use crate::ingest::record::parse_record;
use serde::{Deserialize, Serialize};

/// Outcome of merging a flushed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestAck {
    /// Records applied to the store.
    pub ack: usize,
    /// Lines received, including skipped ones.
    pub lines: usize,
}

/// Parse a newline-delimited batch and merge it into one filter.
///
/// Malformed lines are skipped without aborting the batch. All well-formed
/// records are applied in a single store call.
pub fn ingest_batch(
    store: &FilterStore,
    id: &FilterId,
    body: &str,
) -> Result<IngestAck, RegistryError> {
    let mut lines = 0;
    let mut records: Vec<ResultRecord> = Vec::new();

    for line in body.lines() {
        lines += 1;
        match parse_record(line) {
            Some(record) => records.push(record),
            None => {
                if !line.trim().is_empty() {
                    tracing::debug!(filter_id = %id, line, "skipping malformed result line");
                }
            }
        }
    }

    let ack = store.merge_results(id, &records)?;

    if ack < lines {
        tracing::warn!(filter_id = %id, ack, lines, "batch contained unusable lines");
    }

    Ok(IngestAck { ack, lines })
}
