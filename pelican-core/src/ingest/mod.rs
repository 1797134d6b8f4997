mod merge;
mod record;

pub use merge::{IngestAck, ingest_batch};
pub use record::{format_batch, format_record, parse_record};
