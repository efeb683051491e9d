//! Decoded event records.

use serde::Serialize;

/// One event recovered from a journal.
///
/// Declaration order is the JSONL column order and the names are byte-exact
/// for downstream loaders. `host`/`source`/`sourcetype` are verbatim
/// dictionary (or per-event metadata) values; nothing strips a `host::`
/// style prefix the upstream writer may have embedded. `message` is the raw
/// payload decoded as UTF-8 with invalid sequences replaced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Event {
    pub host: String,
    pub source: String,
    pub sourcetype: String,
    pub index_time: u64,
    pub message: String,
    pub stream_id: u64,
    pub stream_offset: u64,
}
