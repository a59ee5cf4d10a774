use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use cqrskit_core::{EventId, KindId, StreamName};

/// A record as stored, before decoding.
///
/// `position` is the record's 0-based offset in its stream. Positions are
/// assigned by the store on append and never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub event_id: EventId,
    pub kind: KindId,
    pub position: u64,
    pub recorded_at: DateTime<Utc>,
    pub payload: JsonValue,
}

/// One forward read of a stream.
///
/// `next_position` is where the following read should start. A page may be
/// empty; `end_of_stream` tells the reader to stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamPage {
    pub records: Vec<RawRecord>,
    pub next_position: u64,
    pub end_of_stream: bool,
}

impl StreamPage {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Event store read error.
///
/// `StreamNotFound` and `StreamDeleted` are expected outcomes the caller can
/// act on. `Backend` covers everything else the store could not do.
#[derive(Debug, Error)]
pub enum EventStoreError {
    #[error("stream '{0}' not found")]
    StreamNotFound(StreamName),

    #[error("stream '{0}' has been deleted")]
    StreamDeleted(StreamName),

    #[error("event store backend failure: {0}")]
    Backend(String),
}

/// Read side of an append-only event store.
///
/// Implementations must:
/// - return records in position order, starting at `from`
/// - return at most `max_count` records
/// - set `next_position` to one past the last returned record (or `from` if none)
/// - never move `next_position` backwards relative to `from`
pub trait ReadableEventStore: Send + Sync {
    fn read_forward(&self, stream: &StreamName, from: u64, max_count: usize) -> Result<StreamPage, EventStoreError>;
}

impl<S> ReadableEventStore for Arc<S>
where
    S: ReadableEventStore + ?Sized,
{
    fn read_forward(&self, stream: &StreamName, from: u64, max_count: usize) -> Result<StreamPage, EventStoreError> {
        (**self).read_forward(stream, from, max_count)
    }
}
